//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every route pattern once so malformed ones fail at startup
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::routing::pattern::{PatternError, RouteRule};

/// A single semantic problem found in a configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("redirect.public_scheme must be http or https, got {0:?}")]
    InvalidScheme(String),

    #[error("language.default_language must not be empty")]
    EmptyDefaultLanguage,

    #[error("language.supported_languages must not be empty")]
    NoSupportedLanguages,

    #[error("language.supported_languages contains an invalid tag {0:?}")]
    InvalidLanguage(String),

    #[error("language.listen_on_paths: {0}")]
    Pattern(#[from] PatternError),

    #[error("exclusions.media_extensions contains an invalid extension {0:?}")]
    InvalidExtension(String),

    #[error("exclusions.admin_prefixes entries must start with '/', got {0:?}")]
    InvalidAdminPrefix(String),

    #[error("currency.{0} must not be empty")]
    EmptyCurrencyField(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_address(&mut errors, "origin.address", &config.origin.address);

    let scheme = config.redirect.public_scheme.as_str();
    if scheme != "http" && scheme != "https" {
        errors.push(ValidationError::InvalidScheme(scheme.to_string()));
    }

    let language = &config.language;
    if language.default_language.trim().is_empty() {
        errors.push(ValidationError::EmptyDefaultLanguage);
    }
    if language.supported_languages.is_empty() {
        errors.push(ValidationError::NoSupportedLanguages);
    }
    for tag in &language.supported_languages {
        if !is_language_tag(tag) {
            errors.push(ValidationError::InvalidLanguage(tag.clone()));
        }
    }
    if !language.listen_on_all_paths {
        for pattern in &language.listen_on_paths {
            if let Err(e) = RouteRule::parse(pattern) {
                errors.push(e.into());
            }
        }
    }

    for ext in &config.exclusions.media_extensions {
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            errors.push(ValidationError::InvalidExtension(ext.clone()));
        }
    }
    for prefix in &config.exclusions.admin_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::InvalidAdminPrefix(prefix.clone()));
        }
    }

    let currency = &config.currency;
    if currency.enabled {
        if currency.cookie_name.trim().is_empty() {
            errors.push(ValidationError::EmptyCurrencyField("cookie_name"));
        }
        if currency.default_currency.trim().is_empty() {
            errors.push(ValidationError::EmptyCurrencyField("default_currency"));
        }
        if currency.country_header.trim().is_empty() {
            errors.push(ValidationError::EmptyCurrencyField("country_header"));
        }
    }

    if config.cache.enabled && config.cache.ttl_secs == 0 {
        errors.push(ValidationError::Zero("cache.ttl_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.origin_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.origin_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

// A usable tag is a path segment: letters, digits and hyphens.
fn is_language_tag(tag: &str) -> bool {
    !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
