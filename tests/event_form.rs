//! Event creation form validation: every violated field is reported at
//! once, and the accepted date shapes match what browsers submit.

use campusboard::models::event::EventForm;

fn form(fields: &[(&str, &str)]) -> EventForm {
    let mut form = EventForm::default();
    for (name, value) in fields {
        form.set_field(name, value.to_string());
    }
    form
}

#[test]
fn complete_form_passes() {
    let parsed = form(&[
        ("title", "Spring Hackathon"),
        ("description", "24 hours of building"),
        ("date", "2025-01-01T10:00"),
        ("location", "Hall A"),
        ("category", "Tech"),
        ("registerLink", "https://example.com/reg"),
    ])
    .validate()
    .unwrap();

    assert_eq!(parsed.title, "Spring Hackathon");
    assert_eq!(parsed.location, "Hall A");
    assert_eq!(parsed.date.to_rfc3339(), "2025-01-01T10:00:00+00:00");
    assert_eq!(parsed.image, None);
}

#[test]
fn rfc3339_dates_are_accepted() {
    let parsed = form(&[
        ("title", "Career Fair"),
        ("description", "Meet employers"),
        ("date", "2025-03-15T09:30:00Z"),
        ("location", "Gym"),
        ("category", "Career"),
        ("registerLink", "https://example.com/fair"),
    ])
    .validate()
    .unwrap();

    assert_eq!(parsed.date.to_rfc3339(), "2025-03-15T09:30:00+00:00");
}

#[test]
fn empty_form_reports_every_required_field() {
    let violations = EventForm::default().validate().unwrap_err();
    let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();

    for expected in ["title", "description", "date", "location", "category", "registerLink"] {
        assert!(fields.contains(&expected), "missing violation for {expected}");
    }
}

#[test]
fn violations_accumulate_rather_than_short_circuit() {
    let violations = form(&[
        ("title", "Bake Sale"),
        ("description", "Cookies"),
        ("date", "next tuesday"),
        ("location", "Quad"),
        ("category", "Social"),
        ("registerLink", "not-a-url"),
    ])
    .validate()
    .unwrap_err();

    let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
    assert_eq!(fields.len(), 2);
    assert!(fields.contains(&"date"));
    assert!(fields.contains(&"registerLink"));
}

#[test]
fn whitespace_only_fields_are_missing() {
    let violations = form(&[
        ("title", "   "),
        ("description", "desc"),
        ("date", "2025-01-01T10:00"),
        ("location", "Hall A"),
        ("category", "Tech"),
        ("registerLink", "https://example.com/reg"),
    ])
    .validate()
    .unwrap_err();

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "title");
}

#[test]
fn bad_image_url_is_a_violation() {
    let violations = form(&[
        ("title", "Movie Night"),
        ("description", "Outdoor screening"),
        ("date", "2025-06-01T20:00"),
        ("location", "Lawn"),
        ("category", "Social"),
        ("registerLink", "https://example.com/movie"),
        ("imageUrl", "poster.png"),
    ])
    .validate()
    .unwrap_err();

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "imageUrl");
}

#[test]
fn uploaded_image_takes_precedence_over_image_url() {
    let mut f = form(&[
        ("title", "Movie Night"),
        ("description", "Outdoor screening"),
        ("date", "2025-06-01T20:00"),
        ("location", "Lawn"),
        ("category", "Social"),
        ("registerLink", "https://example.com/movie"),
        ("imageUrl", "https://cdn.example.com/poster.png"),
    ]);
    f.image_path = Some("/uploads/123-poster.png".to_string());

    let parsed = f.validate().unwrap();
    assert_eq!(parsed.image.as_deref(), Some("/uploads/123-poster.png"));
}

#[test]
fn unknown_fields_are_ignored() {
    let parsed = form(&[
        ("title", "Quiz Night"),
        ("description", "Trivia"),
        ("date", "2025-02-01T19:00"),
        ("location", "Union"),
        ("category", "Social"),
        ("registerLink", "https://example.com/quiz"),
        ("organizerNotes", "should be dropped"),
    ])
    .validate()
    .unwrap();

    assert_eq!(parsed.title, "Quiz Night");
}
