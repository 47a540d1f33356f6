use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::error::FieldViolation;
use crate::models::user::UserSummary;
use crate::validators;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "org_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrgCategory {
    Tech,
    Arts,
    Cultural,
    Sports,
    Other,
}

impl OrgCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tech" => Some(OrgCategory::Tech),
            "arts" => Some(OrgCategory::Arts),
            "cultural" => Some(OrgCategory::Cultural),
            "sports" => Some(OrgCategory::Sports),
            "other" => Some(OrgCategory::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct SocialLinks {
    pub website: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
}

/// Student organization record
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: OrgCategory,
    pub contact_email: Option<String>,
    pub logo: Option<String>,
    #[sqlx(flatten)]
    #[serde(rename = "socialLinks")]
    pub social_links: SocialLinks,
    pub president: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Organization with president and members dereferenced to user summaries
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: OrgCategory,
    pub contact_email: Option<String>,
    pub logo: Option<String>,
    pub social_links: SocialLinks,
    pub president: Option<UserSummary>,
    pub members: Vec<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrganizationResponse {
    pub fn new(
        organization: Organization,
        president: Option<UserSummary>,
        members: Vec<UserSummary>,
    ) -> Self {
        Self {
            id: organization.id,
            name: organization.name,
            description: organization.description,
            category: organization.category,
            contact_email: organization.contact_email,
            logo: organization.logo,
            social_links: organization.social_links,
            president,
            members,
            created_at: organization.created_at,
            updated_at: organization.updated_at,
        }
    }
}

/// Validated fields for a new organization
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub description: String,
    pub category: OrgCategory,
    pub contact_email: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
}

/// Accumulates multipart form fields for organization creation
#[derive(Debug, Default)]
pub struct OrganizationForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub contact_email: Option<String>,
    pub website: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub logo_path: Option<String>,
}

impl OrganizationForm {
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = Some(value),
            "description" => self.description = Some(value),
            "category" => self.category = Some(value),
            "contactEmail" => self.contact_email = Some(value),
            "socialLinks[website]" => self.website = Some(value),
            "socialLinks[instagram]" => self.instagram = Some(value),
            "socialLinks[twitter]" => self.twitter = Some(value),
            _ => {}
        }
    }

    pub fn validate(self) -> Result<NewOrganization, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        let name = match self.name.as_deref().map(str::trim) {
            None | Some("") => {
                violations.push(FieldViolation::new("name", "Name is required"));
                None
            }
            Some(trimmed) => Some(trimmed.to_string()),
        };

        // Missing category falls back to Other; an unknown one is a violation
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => Some(OrgCategory::Other),
            Some(raw) => match OrgCategory::parse(raw) {
                Some(parsed) => Some(parsed),
                None => {
                    violations.push(FieldViolation::new("category", "Unknown category"));
                    None
                }
            },
        };

        let contact_email = self
            .contact_email
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase());
        if let Some(email) = &contact_email {
            if !validators::validate_email(email) {
                violations.push(FieldViolation::new(
                    "contactEmail",
                    "Contact email must be a valid email",
                ));
            }
        }

        match (name, category) {
            (Some(name), Some(category)) if violations.is_empty() => Ok(NewOrganization {
                name,
                description: self
                    .description
                    .map(|d| d.trim().to_string())
                    .unwrap_or_default(),
                category,
                contact_email,
                logo: self.logo_path,
                website: non_empty(self.website),
                instagram: non_empty(self.instagram),
                twitter: non_empty(self.twitter),
            }),
            _ => Err(violations),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!(OrgCategory::parse("Tech"), Some(OrgCategory::Tech));
        assert_eq!(OrgCategory::parse("SPORTS"), Some(OrgCategory::Sports));
        assert_eq!(OrgCategory::parse("knitting"), None);
    }

    #[test]
    fn test_form_defaults_category_to_other() {
        let mut form = OrganizationForm::default();
        form.set_field("name", "Robotics Club".into());
        let org = form.validate().unwrap();
        assert_eq!(org.category, OrgCategory::Other);
        assert_eq!(org.description, "");
    }

    #[test]
    fn test_form_collects_violations() {
        let mut form = OrganizationForm::default();
        form.set_field("category", "knitting".into());
        form.set_field("contactEmail", "not-an-email".into());
        let violations = form.validate().unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"category"));
        assert!(fields.contains(&"contactEmail"));
    }

    #[test]
    fn test_social_links_bracket_fields() {
        let mut form = OrganizationForm::default();
        form.set_field("name", "Chess Society".into());
        form.set_field("socialLinks[instagram]", "@chess".into());
        form.set_field("socialLinks[website]", "  ".into());
        let org = form.validate().unwrap();
        assert_eq!(org.instagram.as_deref(), Some("@chess"));
        assert_eq!(org.website, None);
    }
}
