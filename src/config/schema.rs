//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the redirector.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the language redirector.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The website the redirector sits in front of.
    pub origin: OriginConfig,

    /// How redirect URLs are built.
    pub redirect: RedirectConfig,

    /// Language negotiation and route scope.
    pub language: LanguageConfig,

    /// Paths that are never evaluated.
    pub exclusions: ExclusionConfig,

    /// Currency cookie settings.
    pub currency: CurrencyConfig,

    /// Redirect cache settings.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Origin server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Origin address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Redirect construction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Scheme used in `Location` when the request carries no
    /// `X-Forwarded-Proto` and no absolute URI.
    pub public_scheme: String,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            public_scheme: "https".to_string(),
        }
    }
}

/// Language negotiation and scope configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Language served without a prefix.
    pub default_language: String,

    /// Languages that may be redirected to (ordered, case-insensitive).
    pub supported_languages: Vec<String>,

    /// Route patterns that are evaluated for redirection.
    pub listen_on_paths: Vec<String>,

    /// Treat every path as in scope.
    pub listen_on_all_paths: bool,

    /// Probe the origin for out-of-scope paths and evaluate them on 404.
    pub always_on_not_found: bool,

    /// Evaluate paths that already start with a language segment.
    /// Dangerous: can reintroduce redirect loops.
    pub listen_on_prefixed_paths: bool,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            supported_languages: vec!["en".to_string()],
            listen_on_paths: vec!["/".to_string()],
            listen_on_all_paths: false,
            always_on_not_found: false,
            listen_on_prefixed_paths: false,
        }
    }
}

/// Unconditional bypass rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExclusionConfig {
    /// File extensions (without dot) that are never redirected.
    pub media_extensions: Vec<String>,

    /// Path prefixes of administrative areas.
    pub admin_prefixes: Vec<String>,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        let media = [
            "jpg", "jpeg", "png", "gif", "webp", "avif", "svg", "ico", "bmp", "tif", "tiff",
            "mp4", "webm", "ogv", "mov", "avi", "mkv", "m4v",
        ];
        Self {
            media_extensions: media.iter().map(|e| e.to_string()).collect(),
            admin_prefixes: vec!["/wp-admin".to_string(), "/wp-login.php".to_string()],
        }
    }
}

/// Currency cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Attach a currency cookie to responses.
    pub enabled: bool,

    /// Cookie holding the client's currency.
    pub cookie_name: String,

    /// Currency used when the country is unknown or unmapped.
    pub default_currency: String,

    /// Header carrying the client's country code, set by the edge platform.
    pub country_header: String,

    /// Cookie lifetime in seconds.
    pub cookie_max_age_secs: u64,

    /// Country code to currency code.
    pub countries: BTreeMap<String, String>,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        let countries = [
            ("US", "USD"),
            ("GB", "GBP"),
            ("DE", "EUR"),
            ("AT", "EUR"),
            ("FR", "EUR"),
            ("IT", "EUR"),
            ("ES", "EUR"),
            ("NL", "EUR"),
            ("CH", "CHF"),
        ];
        Self {
            enabled: false,
            cookie_name: "woocs_curr".to_string(),
            default_currency: "USD".to_string(),
            country_header: "cf-ipcountry".to_string(),
            cookie_max_age_secs: 30 * 24 * 60 * 60,
            countries: countries
                .iter()
                .map(|(c, cur)| (c.to_string(), cur.to_string()))
                .collect(),
        }
    }
}

/// Redirect cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the redirect cache.
    pub enabled: bool,

    /// Entry lifetime in seconds.
    pub ttl_secs: u64,

    /// Maximum number of stored entries.
    pub max_entries: usize,

    /// Largest passthrough body that is buffered for caching.
    pub max_body_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
            max_entries: 10_000,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Timeout for a single origin fetch in seconds.
    pub origin_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            origin_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
