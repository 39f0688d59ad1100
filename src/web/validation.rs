//! Request validation for status updates.
//!
//! Domains and statuses are checked here, before anything reaches the store.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

/// Upper bound for domain names, in characters.
pub const DOMAIN_MAX_LEN: usize = 255;

/// Validation message returned when the domain is missing or empty.
pub const DOMAIN_REQUIRED_MESSAGE: &str = "Domain is required";
/// Validation message returned when the domain is too long.
pub const DOMAIN_TOO_LONG_MESSAGE: &str = "Domain must not exceed 255 characters";
/// Validation message returned when the domain has characters outside `[A-Za-z0-9.-]`.
pub const DOMAIN_INVALID_MESSAGE: &str =
    "Domain may only contain letters, digits, '.' and '-'";
/// Validation message returned when the status is missing or empty.
pub const STATUS_REQUIRED_MESSAGE: &str = "Status is required";

lazy_static! {
    static ref DOMAIN_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9.-]+$").unwrap();
}

/// Input-validation error with a stable, client-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputError {
    message: &'static str,
}

impl InputError {
    fn new(message: &'static str) -> Self {
        Self { message }
    }

    pub const fn message(&self) -> &'static str {
        self.message
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl std::error::Error for InputError {}

pub fn validate_domain(domain: &str) -> Result<(), InputError> {
    if domain.is_empty() {
        return Err(InputError::new(DOMAIN_REQUIRED_MESSAGE));
    }
    if domain.chars().count() > DOMAIN_MAX_LEN {
        return Err(InputError::new(DOMAIN_TOO_LONG_MESSAGE));
    }
    if !DOMAIN_PATTERN.is_match(domain) {
        return Err(InputError::new(DOMAIN_INVALID_MESSAGE));
    }
    Ok(())
}

pub fn validate_status(status: &str) -> Result<(), InputError> {
    if status.is_empty() {
        return Err(InputError::new(STATUS_REQUIRED_MESSAGE));
    }
    Ok(())
}
