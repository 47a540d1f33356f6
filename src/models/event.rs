use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::FieldViolation;
use crate::validators;

/// Event record. Created unapproved by an organizer; only an admin decision
/// flips `approved` (or deletes the record on rejection).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub category: String,
    pub register_link: String,
    /// Uploaded path (`/uploads/..`) or an external URL
    pub image: Option<String>,
    pub approved: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event annotated with its creator's name and email, for the admin
/// approval queue and recent-activity feed.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventWithCreator {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub creator_name: String,
    pub creator_email: String,
}

/// Validated fields for a new event, ready to persist
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub category: String,
    pub register_link: String,
    pub image: Option<String>,
}

/// Admin approval decision body
#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub approved: bool,
}

/// Accumulates multipart form fields for event creation. `validate`
/// reports every violated field at once rather than stopping at the first.
#[derive(Debug, Default)]
pub struct EventForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub register_link: Option<String>,
    pub image_url: Option<String>,
    /// Set when an image file was uploaded; takes precedence over imageUrl
    pub image_path: Option<String>,
}

impl EventForm {
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "description" => self.description = Some(value),
            "date" => self.date = Some(value),
            "location" => self.location = Some(value),
            "category" => self.category = Some(value),
            "registerLink" => self.register_link = Some(value),
            "imageUrl" => self.image_url = Some(value),
            _ => {}
        }
    }

    pub fn validate(self) -> Result<NewEvent, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        let title = required_text(self.title, "title", "Title is required", &mut violations);
        let description = required_text(
            self.description,
            "description",
            "Description is required",
            &mut violations,
        );
        let location = required_text(
            self.location,
            "location",
            "Location is required",
            &mut violations,
        );
        let category = required_text(
            self.category,
            "category",
            "Category is required",
            &mut violations,
        );

        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => {
                violations.push(FieldViolation::new("date", "Date is required"));
                None
            }
            Some(raw) => match parse_event_date(raw) {
                Some(parsed) => Some(parsed),
                None => {
                    violations.push(FieldViolation::new("date", "Date must be a valid timestamp"));
                    None
                }
            },
        };

        let register_link = match self.register_link.as_deref().map(str::trim) {
            Some(link) if validators::validate_url(link) => Some(link.to_string()),
            _ => {
                violations.push(FieldViolation::new(
                    "registerLink",
                    "A valid registration link is required",
                ));
                None
            }
        };

        let image_url = self
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if let Some(url) = &image_url {
            if !validators::validate_url(url) {
                violations.push(FieldViolation::new("imageUrl", "Image URL must be a valid URL"));
            }
        }

        match (title, description, location, category, date, register_link) {
            (Some(title), Some(description), Some(location), Some(category), Some(date), Some(register_link))
                if violations.is_empty() =>
            {
                Ok(NewEvent {
                    title,
                    description,
                    date,
                    location,
                    category,
                    register_link,
                    image: self.image_path.or(image_url),
                })
            }
            _ => Err(violations),
        }
    }
}

fn required_text(
    value: Option<String>,
    field: &str,
    message: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => {
            violations.push(FieldViolation::new(field, message));
            None
        }
        Some(trimmed) => Some(trimmed.to_string()),
    }
}

/// Accept RFC 3339 or the datetime-local shapes browsers submit
fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    None
}
