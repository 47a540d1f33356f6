use once_cell::sync::Lazy;
use regex::Regex;

/// Input validation utilities shared by request DTOs and form parsing

// Compile regex patterns once at startup
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("hardcoded email regex is invalid - fix source code")
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/$.?#].[^\s]*$")
        .expect("hardcoded url regex is invalid - fix source code")
});

/// File extensions accepted for event images and organization logos
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Validate email format (RFC 5322 simplified)
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Validate that a string is an http(s) URL
pub fn validate_url(url: &str) -> bool {
    URL_REGEX.is_match(url)
}

/// Minimum password length; strength beyond length is not enforced
pub fn validate_password(password: &str) -> bool {
    password.len() >= 8
}

/// Return the lowercase extension of `filename` when it is an accepted
/// image type, `None` otherwise.
pub fn allowed_image_extension(filename: &str) -> Option<String> {
    let ext = filename.rsplit_once('.')?.1.to_lowercase();
    if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(ext)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("test.user+tag@sub.example.co.uk"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!validate_email("invalid"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@"));
    }

    #[test]
    fn test_valid_url() {
        assert!(validate_url("https://example.com/reg"));
        assert!(validate_url("http://campus.edu/events?id=3"));
    }

    #[test]
    fn test_invalid_url() {
        assert!(!validate_url("example.com"));
        assert!(!validate_url("ftp://example.com/file"));
        assert!(!validate_url("https://bad url.com"));
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("longenough"));
        assert!(!validate_password("short"));
    }

    #[test]
    fn test_image_extensions() {
        assert_eq!(
            allowed_image_extension("poster.PNG").as_deref(),
            Some("png")
        );
        assert_eq!(
            allowed_image_extension("photo.jpeg").as_deref(),
            Some("jpeg")
        );
        assert!(allowed_image_extension("script.exe").is_none());
        assert!(allowed_image_extension("archive.tar.gz").is_none());
        assert!(allowed_image_extension("noextension").is_none());
    }
}
