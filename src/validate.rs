use thiserror::Error;
use url::Url;

/// Field-level validation failure, surfaced inline next to the offending
/// form field. Never touches persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field is required")]
    Required,
    #[error("invalid URL")]
    InvalidUrl,
    #[error("URL did not resolve to a valid feed")]
    InvalidFeed,
}

/// Per-field errors from validating the add/edit feed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldErrors {
    pub name: Option<ValidationError>,
    pub url: Option<ValidationError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none()
    }
}

/// Local half of add/edit validation: name non-empty, url non-empty and
/// a parseable http/https/ftp URL with a host. Remote validation against
/// the conversion endpoint happens separately once this passes.
pub fn validate_feed_form(name: &str, url: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    if name.is_empty() {
        errors.name = Some(ValidationError::Required);
    }
    if url.is_empty() {
        errors.url = Some(ValidationError::Required);
    } else if !is_valid_feed_url(url) {
        errors.url = Some(ValidationError::InvalidUrl);
    }
    errors
}

fn is_valid_feed_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https" | "ftp") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}
