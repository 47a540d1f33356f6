/// Authentication handlers
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::config::Config;
use crate::db;
use crate::error::{ApiError, Result};
use crate::middleware::Principal;
use crate::models::user::{
    AuthResponse, LoginRequest, RegisterRequest, Role, UpdatePasswordRequest, UserStatus,
};
use crate::security::{jwt, password};

/// POST /api/auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let role = payload.role.unwrap_or(Role::Student);

    // Elevated roles need the shared secret; students never do
    if role != Role::Student {
        let secret_matches = match (&config.role_secret, &payload.role_secret) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        };
        if !secret_matches {
            return Err(ApiError::Forbidden(
                "A valid role secret is required to register with this role".to_string(),
            ));
        }
    }

    let email = payload.email.trim().to_lowercase();
    if db::users::email_exists(&pool, &email).await? {
        return Err(ApiError::Conflict(
            "A user already exists with this email".to_string(),
        ));
    }

    let password_hash = password::hash_password(&payload.password)?;
    let user = db::users::insert(&pool, payload.name.trim(), &email, &password_hash, role).await?;

    let token = jwt::issue_token(user.id, user.role).map_err(ApiError::from)?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// POST /api/auth/login
pub async fn login(
    pool: web::Data<PgPool>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let email = payload.email.trim().to_lowercase();

    // Unknown email and bad password fail identically
    let user = db::users::find_by_email(&pool, &email)
        .await?
        .ok_or(ApiError::AuthenticationFailed)?;

    password::verify_password(&payload.password, &user.password_hash)?;

    if user.status == UserStatus::Suspended {
        return Err(ApiError::Forbidden("Account suspended".to_string()));
    }

    let token = jwt::issue_token(user.id, user.role).map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// POST /api/auth/update-password
pub async fn update_password(
    pool: web::Data<PgPool>,
    principal: Principal,
    payload: web::Json<UpdatePasswordRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let user = db::users::find_by_id(&pool, principal.id)
        .await?
        .ok_or(ApiError::AuthenticationFailed)?;

    password::verify_password(&payload.current_password, &user.password_hash)?;

    let new_hash = password::hash_password(&payload.new_password)?;
    db::users::update_password(&pool, user.id, &new_hash).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Password updated successfully"
    })))
}
