/// Student organization handlers
use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::db::memberships::{self, MembershipSet};
use crate::error::{ApiError, Result};
use crate::middleware::Principal;
use crate::models::organization::{Organization, OrganizationForm, OrganizationResponse};
use crate::models::user::UserSummary;
use crate::uploads;

/// Attach president and member summaries to a batch of organizations
async fn with_people(
    pool: &PgPool,
    organizations: Vec<Organization>,
) -> Result<Vec<OrganizationResponse>> {
    let org_ids: Vec<Uuid> = organizations.iter().map(|o| o.id).collect();
    let president_ids: Vec<Uuid> = organizations.iter().map(|o| o.president).collect();

    let mut members = db::organizations::members_by_organization(pool, &org_ids).await?;
    let presidents: HashMap<Uuid, UserSummary> = db::users::summaries_by_ids(pool, &president_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(organizations
        .into_iter()
        .map(|org| {
            let president = presidents.get(&org.president).cloned();
            let org_members = members.remove(&org.id).unwrap_or_default();
            OrganizationResponse::new(org, president, org_members)
        })
        .collect())
}

/// GET /api/organizations (public)
pub async fn list(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let organizations = db::organizations::list(&pool).await?;
    let annotated = with_people(&pool, organizations).await?;
    Ok(HttpResponse::Ok().json(annotated))
}

/// GET /api/organizations/{id} (public)
pub async fn get_organization(
    pool: web::Data<PgPool>,
    organization_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let organization = db::organizations::find_by_id(&pool, organization_id.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Organization".to_string()))?;

    let mut annotated = with_people(&pool, vec![organization]).await?;
    let response = annotated
        .pop()
        .ok_or_else(|| ApiError::Internal("Organization annotation failed".to_string()))?;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/organizations (organizer) - multipart form; the creator becomes
/// president and first member
pub async fn create_organization(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    principal: Principal,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = OrganizationForm::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| ApiError::BadRequest(format!("Malformed multipart payload: {e}")))?;

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "logo" {
            form.logo_path = Some(uploads::save_image_field(&mut field, &config.upload_dir).await?);
        } else {
            let value = uploads::read_text_field(&mut field).await?;
            form.set_field(&name, value);
        }
    }

    let fields = form.validate().map_err(ApiError::Validation)?;
    let organization = db::organizations::insert(&pool, principal.id, &fields).await?;

    tracing::info!(organization_id = %organization.id, president = %principal.id, "organization created");

    let mut annotated = with_people(&pool, vec![organization]).await?;
    let response = annotated
        .pop()
        .ok_or_else(|| ApiError::Internal("Organization annotation failed".to_string()))?;

    Ok(HttpResponse::Created().json(response))
}

/// POST /api/organizations/{id}/follow (any authenticated user)
pub async fn toggle_follow(
    pool: web::Data<PgPool>,
    principal: Principal,
    organization_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let organization_id = organization_id.into_inner();

    if db::organizations::find_by_id(&pool, organization_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Organization".to_string()));
    }

    let followed = memberships::toggle(
        &pool,
        principal.id,
        organization_id,
        MembershipSet::OrganizationFollows,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "followed": followed })))
}

/// GET /api/organizations/followed/me (any authenticated user)
pub async fn followed(pool: web::Data<PgPool>, principal: Principal) -> Result<HttpResponse> {
    let organizations = memberships::followed_organizations(&pool, principal.id).await?;
    Ok(HttpResponse::Ok().json(organizations))
}
