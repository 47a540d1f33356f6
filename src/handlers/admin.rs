/// Admin handlers - user management and dashboard aggregates.
/// Every route here sits behind the admin role guard.
use actix_web::{web, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::db;
use crate::error::{ApiError, Result};
use crate::models::user::{AdminCreateUserRequest, AdminUpdateUserRequest, UserProfile, UserStatus};
use crate::security::password;

const RECENT_ACTIVITY_LIMIT: i64 = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_events: i64,
    pub approved_events: i64,
    pub pending_events: i64,
}

/// GET /api/admin/users
pub async fn list_users(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let users = db::users::list_profiles(&pool).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// POST /api/admin/users - seeded with the configured default password
pub async fn create_user(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    payload: web::Json<AdminCreateUserRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let email = payload.email.trim().to_lowercase();
    if db::users::email_exists(&pool, &email).await? {
        return Err(ApiError::Conflict(
            "A user already exists with this email".to_string(),
        ));
    }

    let password_hash = password::hash_password(&config.default_user_password)?;
    let status = payload.status.unwrap_or(UserStatus::Active);

    let user = db::users::admin_insert(
        &pool,
        payload.name.trim(),
        &email,
        &password_hash,
        payload.role,
        status,
    )
    .await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user created by admin");

    Ok(HttpResponse::Created().json(UserProfile::from(user)))
}

/// PUT /api/admin/users/{id} - partial update of name/role/status
pub async fn update_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    payload: web::Json<AdminUpdateUserRequest>,
) -> Result<HttpResponse> {
    let user = db::users::admin_update(
        &pool,
        user_id.into_inner(),
        payload.name.as_deref(),
        payload.role,
        payload.status,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(pool: web::Data<PgPool>, user_id: web::Path<Uuid>) -> Result<HttpResponse> {
    let user_id = user_id.into_inner();

    if !db::users::delete(&pool, user_id).await? {
        return Err(ApiError::NotFound("User".to_string()));
    }

    tracing::info!(%user_id, "user deleted by admin");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "User deleted successfully" })))
}

/// GET /api/admin/stats
pub async fn stats(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let total_users = db::users::count(&pool).await?;
    let total_events = db::events::count(&pool).await?;
    let approved_events = db::events::count_by_approval(&pool, true).await?;
    let pending_events = db::events::count_by_approval(&pool, false).await?;

    Ok(HttpResponse::Ok().json(StatsResponse {
        total_users,
        total_events,
        approved_events,
        pending_events,
    }))
}

/// GET /api/admin/recent-activity - latest submissions with creator info
pub async fn recent_activity(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let events = db::events::recent_with_creator(&pool, RECENT_ACTIVITY_LIMIT).await?;
    Ok(HttpResponse::Ok().json(events))
}
