/// User database operations
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::user::{Role, User, UserProfile, UserStatus, UserSummary};

/// Translate a unique-constraint hit on `users.email` into the API's
/// duplicate-email error; anything else propagates as a database error.
fn map_insert_error(err: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return ApiError::Conflict("A user already exists with this email".to_string());
        }
    }
    err.into()
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, status, created_at, updated_at
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, status, created_at, updated_at
         FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Insert a self-registered user (active by default)
pub async fn insert(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, email, password_hash, role, status, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(map_insert_error)?;

    Ok(user)
}

/// Insert an admin-created account with an explicit status
pub async fn admin_insert(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
    status: UserStatus,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash, role, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, email, password_hash, role, status, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(status)
    .fetch_one(pool)
    .await
    .map_err(map_insert_error)?;

    Ok(user)
}

pub async fn update_password(pool: &PgPool, user_id: Uuid, password_hash: &str) -> Result<()> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(pool)
        .await?;

    Ok(())
}

/// All users, hash-free, for the admin panel
pub async fn list_profiles(pool: &PgPool) -> Result<Vec<UserProfile>> {
    let users = sqlx::query_as::<_, UserProfile>(
        "SELECT id, name, email, role, status, created_at
         FROM users ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Partial update of name/role/status; returns None when the id is unknown
pub async fn admin_update(
    pool: &PgPool,
    user_id: Uuid,
    name: Option<&str>,
    role: Option<Role>,
    status: Option<UserStatus>,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            role = COALESCE($3, role),
            status = COALESCE($4, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, email, password_hash, role, status, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(role)
    .bind(status)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn delete(pool: &PgPool, user_id: Uuid) -> Result<bool> {
    let affected = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

pub async fn count(pool: &PgPool) -> Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(total)
}

/// Batch lookup of user summaries (presidents of listed organizations)
pub async fn summaries_by_ids(pool: &PgPool, user_ids: &[Uuid]) -> Result<Vec<UserSummary>> {
    if user_ids.is_empty() {
        return Ok(vec![]);
    }

    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT id, name, email, role FROM users WHERE id = ANY($1)",
    )
    .bind(user_ids)
    .fetch_all(pool)
    .await?;

    Ok(users)
}
