//! Input validation and sanitization utilities
//!
//! This module provides utilities for validating and sanitizing user input,
//! configuration values, and API parameters.

use crate::error::UtilsError;

/// Validate that a URL is properly formatted
pub fn validate_url(url: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(UtilsError::Validation {
            message: "URL cannot be empty".to_string(),
        }
        .into());
    }

    // Basic URL validation - must start with http:// or https://
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(UtilsError::Validation {
            message: format!(
                "Invalid URL '{}': URL must start with http:// or https://",
                url
            ),
        }
        .into());
    }

    Ok(())
}

/// Validate a resource or namespace name before it is spliced into a URL path
pub fn validate_name(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(UtilsError::Validation {
            message: "Name cannot be empty".to_string(),
        }
        .into());
    }

    if name.contains('/') || name.contains(char::is_whitespace) {
        return Err(UtilsError::Validation {
            message: format!("Invalid name '{}': must not contain '/' or whitespace", name),
        }
        .into());
    }

    Ok(())
}
