/// Membership toggle service
///
/// Both user-owned sets (event bookmarks, followed organizations) share one
/// idempotent toggle: insert-if-absent, otherwise remove. Each statement is
/// atomic at the row level; there is deliberately no surrounding
/// transaction, so two racing toggles on the same pair may both observe the
/// same before-state and the later one wins (lost update, never corruption).
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::event::Event;
use crate::models::organization::Organization;

/// The user-owned sets the toggle operates on; closes over what used to be
/// a free-form set name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipSet {
    Bookmarks,
    OrganizationFollows,
}

impl MembershipSet {
    fn insert_sql(self) -> &'static str {
        match self {
            MembershipSet::Bookmarks => {
                "INSERT INTO bookmarks (user_id, event_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
            }
            MembershipSet::OrganizationFollows => {
                "INSERT INTO organization_follows (user_id, organization_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
            }
        }
    }

    fn delete_sql(self) -> &'static str {
        match self {
            MembershipSet::Bookmarks => {
                "DELETE FROM bookmarks WHERE user_id = $1 AND event_id = $2"
            }
            MembershipSet::OrganizationFollows => {
                "DELETE FROM organization_follows WHERE user_id = $1 AND organization_id = $2"
            }
        }
    }

    fn contains_sql(self) -> &'static str {
        match self {
            MembershipSet::Bookmarks => {
                "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE user_id = $1 AND event_id = $2)"
            }
            MembershipSet::OrganizationFollows => {
                "SELECT EXISTS(SELECT 1 FROM organization_follows WHERE user_id = $1 AND organization_id = $2)"
            }
        }
    }
}

/// Flip `target`'s membership in the owner's set. Returns whether the
/// target is a member afterwards, so `toggle` is its own inverse.
pub async fn toggle(
    pool: &PgPool,
    owner: Uuid,
    target: Uuid,
    set: MembershipSet,
) -> Result<bool> {
    let inserted = sqlx::query(set.insert_sql())
        .bind(owner)
        .bind(target)
        .execute(pool)
        .await?
        .rows_affected();

    if inserted > 0 {
        return Ok(true);
    }

    sqlx::query(set.delete_sql())
        .bind(owner)
        .bind(target)
        .execute(pool)
        .await?;

    Ok(false)
}

pub async fn contains(
    pool: &PgPool,
    owner: Uuid,
    target: Uuid,
    set: MembershipSet,
) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(set.contains_sql())
        .bind(owner)
        .bind(target)
        .fetch_one(pool)
        .await?;

    Ok(exists)
}

/// A user's bookmarked events, dereferenced, in bookmark order
pub async fn bookmarked_events(pool: &PgPool, owner: Uuid) -> Result<Vec<Event>> {
    let events = sqlx::query_as::<_, Event>(
        r#"
        SELECT e.id, e.title, e.description, e.date, e.location, e.category, e.register_link,
               e.image, e.approved, e.created_by, e.created_at, e.updated_at
        FROM bookmarks b
        JOIN events e ON e.id = b.event_id
        WHERE b.user_id = $1
        ORDER BY b.created_at ASC
        "#,
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

/// A user's followed organizations, dereferenced, in follow order
pub async fn followed_organizations(pool: &PgPool, owner: Uuid) -> Result<Vec<Organization>> {
    let organizations = sqlx::query_as::<_, Organization>(
        r#"
        SELECT o.id, o.name, o.description, o.category, o.contact_email, o.logo,
               o.website, o.instagram, o.twitter, o.president, o.created_at, o.updated_at
        FROM organization_follows f
        JOIN organizations o ON o.id = f.organization_id
        WHERE f.user_id = $1
        ORDER BY f.created_at ASC
        "#,
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    Ok(organizations)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The two sets must never touch each other's tables.
    #[test]
    fn test_each_set_targets_its_own_table() {
        for (set, table) in [
            (MembershipSet::Bookmarks, "bookmarks"),
            (MembershipSet::OrganizationFollows, "organization_follows"),
        ] {
            assert!(set.insert_sql().contains(table));
            assert!(set.delete_sql().contains(table));
            assert!(set.contains_sql().contains(table));
        }
        assert!(!MembershipSet::Bookmarks.insert_sql().contains("organization_follows"));
        assert!(!MembershipSet::OrganizationFollows.delete_sql().contains("bookmarks"));
    }

    #[test]
    fn test_insert_is_conflict_free() {
        assert!(MembershipSet::Bookmarks.insert_sql().contains("ON CONFLICT DO NOTHING"));
        assert!(MembershipSet::OrganizationFollows
            .insert_sql()
            .contains("ON CONFLICT DO NOTHING"));
    }
}
