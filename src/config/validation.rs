//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before any subscription is wired

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic violation in a config.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("rollbar.access_token is required and must be non-empty")]
    MissingAccessToken,

    #[error("rollbar.endpoint `{0}` is not a valid URL")]
    InvalidEndpoint(String),

    #[error("exposed_name must be non-empty")]
    EmptyExposedName,

    #[error("report_tag must be non-empty")]
    EmptyReportTag,

    #[error("protocol must be `http` or `https`, got `{0}`")]
    UnknownProtocol(String),
}

/// Validate a config, collecting every violation.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rollbar.access_token.trim().is_empty() {
        errors.push(ValidationError::MissingAccessToken);
    }
    if Url::parse(&config.rollbar.endpoint).is_err() {
        errors.push(ValidationError::InvalidEndpoint(config.rollbar.endpoint.clone()));
    }
    if config.exposed_name.is_empty() {
        errors.push(ValidationError::EmptyExposedName);
    }
    if config.report_tag.is_empty() {
        errors.push(ValidationError::EmptyReportTag);
    }
    if config.protocol != "http" && config.protocol != "https" {
        errors.push(ValidationError::UnknownProtocol(config.protocol.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub(crate) fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
