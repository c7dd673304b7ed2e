//! Event payload validation
//!
//! Length limits are in bytes and sized for what the public listing can
//! render without truncation.

use shared::AppError;
use shared::models::{EventCreate, EventUpdate};

/// Event titles
pub const MAX_TITLE_LEN: usize = 200;

/// Start time labels ("8pm", "Doors 19:30")
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Event descriptions
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Image and ticket links
pub const MAX_URL_LEN: usize = 2048;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Absolute http(s) links or site-relative paths
pub fn validate_optional_url(value: &Option<String>, field: &str) -> Result<(), AppError> {
    validate_optional_text(value, field, MAX_URL_LEN)?;
    if let Some(v) = value
        && !v.is_empty()
        && !(v.starts_with("https://") || v.starts_with("http://") || v.starts_with('/'))
    {
        return Err(AppError::validation(format!(
            "{field} must be an http(s) URL or a site path"
        )));
    }
    Ok(())
}

pub fn validate_event_create(payload: &EventCreate) -> Result<(), AppError> {
    validate_required_text(&payload.title, "title", MAX_TITLE_LEN)?;
    validate_optional_text(&payload.start_time, "startTime", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_optional_url(&payload.image_url, "imageUrl")?;
    validate_optional_url(&payload.ticket_url, "ticketUrl")?;
    Ok(())
}

pub fn validate_event_update(payload: &EventUpdate) -> Result<(), AppError> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_TITLE_LEN)?;
    }
    validate_optional_text(&payload.start_time, "startTime", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_optional_url(&payload.image_url, "imageUrl")?;
    validate_optional_url(&payload.ticket_url, "ticketUrl")?;
    Ok(())
}
