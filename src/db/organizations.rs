/// Organization queries
use std::collections::HashMap;

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::organization::{NewOrganization, Organization};
use crate::models::user::UserSummary;

/// Create an organization; the creating organizer becomes president and
/// first member in the same transaction.
pub async fn insert(
    pool: &PgPool,
    president: Uuid,
    fields: &NewOrganization,
) -> Result<Organization> {
    let mut tx = pool.begin().await?;

    let organization = sqlx::query_as::<_, Organization>(
        r#"
        INSERT INTO organizations
            (name, description, category, contact_email, logo, website, instagram, twitter, president)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, name, description, category, contact_email, logo,
                  website, instagram, twitter, president, created_at, updated_at
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.category)
    .bind(&fields.contact_email)
    .bind(&fields.logo)
    .bind(&fields.website)
    .bind(&fields.instagram)
    .bind(&fields.twitter)
    .bind(president)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO organization_members (organization_id, user_id) VALUES ($1, $2)")
        .bind(organization.id)
        .bind(president)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(organization)
}

pub async fn list(pool: &PgPool) -> Result<Vec<Organization>> {
    let organizations = sqlx::query_as::<_, Organization>(
        r#"
        SELECT id, name, description, category, contact_email, logo,
               website, instagram, twitter, president, created_at, updated_at
        FROM organizations
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(organizations)
}

pub async fn find_by_id(pool: &PgPool, organization_id: Uuid) -> Result<Option<Organization>> {
    let organization = sqlx::query_as::<_, Organization>(
        r#"
        SELECT id, name, description, category, contact_email, logo,
               website, instagram, twitter, president, created_at, updated_at
        FROM organizations
        WHERE id = $1
        "#,
    )
    .bind(organization_id)
    .fetch_optional(pool)
    .await?;

    Ok(organization)
}

#[derive(FromRow)]
struct MemberRow {
    organization_id: Uuid,
    #[sqlx(flatten)]
    user: UserSummary,
}

/// Members of every listed organization in one query, grouped by
/// organization id (avoids a per-organization fetch).
pub async fn members_by_organization(
    pool: &PgPool,
    organization_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<UserSummary>>> {
    if organization_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT om.organization_id, u.id, u.name, u.email, u.role
        FROM organization_members om
        JOIN users u ON u.id = om.user_id
        WHERE om.organization_id = ANY($1)
        ORDER BY om.created_at ASC
        "#,
    )
    .bind(organization_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
    for row in rows {
        grouped.entry(row.organization_id).or_default().push(row.user);
    }

    Ok(grouped)
}
