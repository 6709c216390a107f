//! Request field checks shared by every resource.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// A required text field: must be present and not blank. Returns it trimmed.
pub fn require_text(value: Option<&str>, field: &str) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ValidationError(format!("{} can not be blank", field))),
    }
}

/// An optional text field: absent is fine, present-but-blank is not.
pub fn optional_text(value: Option<&str>, field: &str) -> Result<Option<String>, ValidationError> {
    value.map(|v| require_text(Some(v), field)).transpose()
}
