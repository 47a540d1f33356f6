pub mod events;
pub mod memberships;
pub mod organizations;
pub mod users;
