/// Event lifecycle queries
///
/// Events are born pending (`approved = false`). Approval is a single
/// UPDATE; rejection deletes the record outright - there is no archive.
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::event::{Event, EventWithCreator, NewEvent};
use crate::models::user::UserSummary;

pub async fn insert(pool: &PgPool, created_by: Uuid, fields: &NewEvent) -> Result<Event> {
    let event = sqlx::query_as::<_, Event>(
        r#"
        INSERT INTO events (title, description, date, location, category, register_link, image, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, title, description, date, location, category, register_link, image,
                  approved, created_by, created_at, updated_at
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(fields.date)
    .bind(&fields.location)
    .bind(&fields.category)
    .bind(&fields.register_link)
    .bind(&fields.image)
    .bind(created_by)
    .fetch_one(pool)
    .await?;

    Ok(event)
}

/// Publicly visible events, soonest first
pub async fn list_approved(pool: &PgPool) -> Result<Vec<Event>> {
    let events = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, title, description, date, location, category, register_link, image,
               approved, created_by, created_at, updated_at
        FROM events
        WHERE approved = TRUE
        ORDER BY date ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(events)
}

/// An organizer's own events, newest first, regardless of approval state
pub async fn list_by_creator(pool: &PgPool, created_by: Uuid) -> Result<Vec<Event>> {
    let events = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, title, description, date, location, category, register_link, image,
               approved, created_by, created_at, updated_at
        FROM events
        WHERE created_by = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(created_by)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

/// The admin approval queue, annotated with each creator's name and email
pub async fn list_pending_with_creator(pool: &PgPool) -> Result<Vec<EventWithCreator>> {
    let events = sqlx::query_as::<_, EventWithCreator>(
        r#"
        SELECT e.id, e.title, e.description, e.date, e.location, e.category, e.register_link,
               e.image, e.approved, e.created_by, e.created_at, e.updated_at,
               u.name AS creator_name, u.email AS creator_email
        FROM events e
        JOIN users u ON u.id = e.created_by
        WHERE e.approved = FALSE
        ORDER BY e.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(events)
}

pub async fn find_by_id(pool: &PgPool, event_id: Uuid) -> Result<Option<Event>> {
    let event = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, title, description, date, location, category, register_link, image,
               approved, created_by, created_at, updated_at
        FROM events
        WHERE id = $1
        "#,
    )
    .bind(event_id)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

/// Approve a pending event; returns None when the id is unknown
pub async fn approve(pool: &PgPool, event_id: Uuid) -> Result<Option<Event>> {
    let event = sqlx::query_as::<_, Event>(
        r#"
        UPDATE events
        SET approved = TRUE, updated_at = NOW()
        WHERE id = $1
        RETURNING id, title, description, date, location, category, register_link, image,
                  approved, created_by, created_at, updated_at
        "#,
    )
    .bind(event_id)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

/// Permanently delete an event (the rejection path); true when a row went away
pub async fn delete(pool: &PgPool, event_id: Uuid) -> Result<bool> {
    let affected = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(event_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

pub async fn count(pool: &PgPool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(pool)
        .await?;

    Ok(total)
}

pub async fn count_by_approval(pool: &PgPool, approved: bool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE approved = $1")
        .bind(approved)
        .fetch_one(pool)
        .await?;

    Ok(total)
}

/// Latest submissions for the admin dashboard's activity feed
pub async fn recent_with_creator(pool: &PgPool, limit: i64) -> Result<Vec<EventWithCreator>> {
    let events = sqlx::query_as::<_, EventWithCreator>(
        r#"
        SELECT e.id, e.title, e.description, e.date, e.location, e.category, e.register_link,
               e.image, e.approved, e.created_by, e.created_at, e.updated_at,
               u.name AS creator_name, u.email AS creator_email
        FROM events e
        JOIN users u ON u.id = e.created_by
        ORDER BY e.created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

/// Idempotent registration; true when this call added the row
pub async fn register_user(pool: &PgPool, event_id: Uuid, user_id: Uuid) -> Result<bool> {
    let affected = sqlx::query(
        r#"
        INSERT INTO event_registrations (event_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(event_id)
    .bind(user_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

/// Registered users for an event, dereferenced, in registration order
pub async fn registered_users(pool: &PgPool, event_id: Uuid) -> Result<Vec<UserSummary>> {
    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.name, u.email, u.role
        FROM event_registrations er
        JOIN users u ON u.id = er.user_id
        WHERE er.event_id = $1
        ORDER BY er.created_at ASC
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}
