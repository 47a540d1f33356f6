/// Event handlers - creation, approval workflow, discovery, bookmarks,
/// registrations
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::db::memberships::{self, MembershipSet};
use crate::error::{ApiError, Result};
use crate::middleware::{MaybePrincipal, Principal};
use crate::models::event::{DecideRequest, EventForm};
use crate::models::user::Role;
use crate::uploads;

/// POST /api/events (organizer) - multipart form, created pending approval
pub async fn create_event(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    principal: Principal,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = EventForm::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| ApiError::BadRequest(format!("Malformed multipart payload: {e}")))?;

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            form.image_path = Some(uploads::save_image_field(&mut field, &config.upload_dir).await?);
        } else {
            let value = uploads::read_text_field(&mut field).await?;
            form.set_field(&name, value);
        }
    }

    let fields = form.validate().map_err(ApiError::Validation)?;
    let event = db::events::insert(&pool, principal.id, &fields).await?;

    tracing::info!(event_id = %event.id, organizer = %principal.id, "event submitted for approval");

    Ok(HttpResponse::Created().json(event))
}

/// GET /api/events (public) - approved events, soonest first
pub async fn list_approved(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let events = db::events::list_approved(&pool).await?;
    Ok(HttpResponse::Ok().json(events))
}

/// GET /api/events/my (organizer) - caller's own submissions
pub async fn list_mine(pool: web::Data<PgPool>, principal: Principal) -> Result<HttpResponse> {
    let events = db::events::list_by_creator(&pool, principal.id).await?;
    Ok(HttpResponse::Ok().json(events))
}

/// GET /api/events/pending/all (admin) - approval queue with creator info
pub async fn list_pending(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let events = db::events::list_pending_with_creator(&pool).await?;
    Ok(HttpResponse::Ok().json(events))
}

/// PUT /api/events/{id}/approve (admin)
///
/// Approval flips the flag; rejection deletes the record permanently.
pub async fn decide(
    pool: web::Data<PgPool>,
    event_id: web::Path<Uuid>,
    payload: web::Json<DecideRequest>,
) -> Result<HttpResponse> {
    let event_id = event_id.into_inner();

    if payload.approved {
        let event = db::events::approve(&pool, event_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Event".to_string()))?;

        tracing::info!(event_id = %event.id, "event approved");
        Ok(HttpResponse::Ok().json(event))
    } else {
        if !db::events::delete(&pool, event_id).await? {
            return Err(ApiError::NotFound("Event".to_string()));
        }

        tracing::info!(%event_id, "event rejected and deleted");
        Ok(HttpResponse::Ok().json(serde_json::json!({
            "deleted": true,
            "message": "Event rejected and deleted"
        })))
    }
}

/// GET /api/events/{id} (public)
///
/// Unapproved events are visible only to their creator or an admin;
/// everyone else gets a 404 so pending ids are not confirmable.
pub async fn get_event(
    pool: web::Data<PgPool>,
    event_id: web::Path<Uuid>,
    maybe: MaybePrincipal,
) -> Result<HttpResponse> {
    let event = db::events::find_by_id(&pool, event_id.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Event".to_string()))?;

    if !event.approved {
        let allowed = maybe
            .0
            .map(|p| p.role == Role::Admin || p.id == event.created_by)
            .unwrap_or(false);
        if !allowed {
            return Err(ApiError::NotFound("Event".to_string()));
        }
    }

    Ok(HttpResponse::Ok().json(event))
}

/// POST /api/events/{id}/bookmark (any authenticated user)
pub async fn toggle_bookmark(
    pool: web::Data<PgPool>,
    principal: Principal,
    event_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let event_id = event_id.into_inner();

    if db::events::find_by_id(&pool, event_id).await?.is_none() {
        return Err(ApiError::NotFound("Event".to_string()));
    }

    let bookmarked =
        memberships::toggle(&pool, principal.id, event_id, MembershipSet::Bookmarks).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "bookmarked": bookmarked })))
}

/// GET /api/events/bookmarked (any authenticated user)
pub async fn bookmarked(pool: web::Data<PgPool>, principal: Principal) -> Result<HttpResponse> {
    let events = memberships::bookmarked_events(&pool, principal.id).await?;
    Ok(HttpResponse::Ok().json(events))
}

/// POST /api/events/{id}/register (any authenticated user)
pub async fn register(
    pool: web::Data<PgPool>,
    principal: Principal,
    event_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let event_id = event_id.into_inner();

    if db::events::find_by_id(&pool, event_id).await?.is_none() {
        return Err(ApiError::NotFound("Event".to_string()));
    }

    if !db::events::register_user(&pool, event_id, principal.id).await? {
        return Err(ApiError::BadRequest("Already registered".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "registered": true })))
}

/// GET /api/events/{id}/registrations (any authenticated user)
pub async fn registrations(
    pool: web::Data<PgPool>,
    event_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let event_id = event_id.into_inner();

    if db::events::find_by_id(&pool, event_id).await?.is_none() {
        return Err(ApiError::NotFound("Event".to_string()));
    }

    let registered_users = db::events::registered_users(&pool, event_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "registeredUsers": registered_users })))
}
