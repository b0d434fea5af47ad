//! API utility functions
//!
//! Shared response shapes and input validation for the handlers.

use crate::error::AppError;
use serde::Serialize;

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
    /// Status indicator (e.g., "ok", "error")
    pub status: String,
}

impl MessageResponse {
    /// `status: "ok"` with the given message
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: "ok".to_string(),
        }
    }
}

/// Require a non-blank field, returning it trimmed
///
/// # Returns
/// * `Ok(&str)` - The trimmed value
/// * `Err(AppError)` - The value is empty or whitespace only
pub fn require_field<'a>(value: &'a str, name: &str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", name)));
    }
    Ok(trimmed)
}

/// Require a plausible email address (non-blank, contains `@`)
pub fn require_email<'a>(value: &'a str, name: &str) -> Result<&'a str, AppError> {
    let email = require_field(value, name)?;
    if !email.contains('@') {
        return Err(AppError::Validation(format!(
            "{} is not a valid email address: {}",
            name, email
        )));
    }
    Ok(email)
}
