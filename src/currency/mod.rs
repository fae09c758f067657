//! Currency cookie subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie header ──┐
//!                 ├─→ CurrencyResolver::resolve → (code, should_set)
//! country header ─┘
//!     → should_set: Set-Cookie appended to the outgoing response
//! ```
//!
//! # Design Decisions
//! - An existing currency cookie is never overwritten
//! - Country lookup is case-insensitive, unmapped countries use the default
//! - The Set-Cookie is computed per request and never stored in the cache

use std::collections::HashMap;

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use cookie::{Cookie, SameSite};

use crate::config::CurrencyConfig;

/// Country code to currency code, with a fallback.
#[derive(Debug, Clone)]
pub struct CurrencyTable {
    countries: HashMap<String, String>,
    default_currency: String,
}

impl CurrencyTable {
    pub fn new<I, K, V>(countries: I, default_currency: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self {
            countries: countries
                .into_iter()
                .map(|(k, v)| (k.as_ref().trim().to_ascii_uppercase(), v.as_ref().trim().to_string()))
                .collect(),
            default_currency: default_currency.into(),
        }
    }

    /// Currency for a country, or the default when unknown.
    pub fn lookup(&self, country: Option<&str>) -> &str {
        country
            .map(|c| c.trim().to_ascii_uppercase())
            .and_then(|c| self.countries.get(&c))
            .map(String::as_str)
            .unwrap_or(&self.default_currency)
    }
}

/// Result of currency resolution for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyResolution {
    pub code: String,
    /// True when the client has no currency cookie yet.
    pub should_set: bool,
}

/// Resolve a client's currency from its existing cookie or country.
pub fn resolve_currency(
    existing: Option<&str>,
    country: Option<&str>,
    table: &CurrencyTable,
) -> CurrencyResolution {
    match existing {
        Some(code) => CurrencyResolution {
            code: code.to_string(),
            should_set: false,
        },
        None => CurrencyResolution {
            code: table.lookup(country).to_string(),
            should_set: true,
        },
    }
}

/// Reads currency signals from requests and builds the cookie.
#[derive(Debug, Clone)]
pub struct CurrencyResolver {
    cookie_name: String,
    country_header: String,
    max_age_secs: u64,
    table: CurrencyTable,
}

impl CurrencyResolver {
    pub fn from_config(config: &CurrencyConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            country_header: config.country_header.clone(),
            max_age_secs: config.cookie_max_age_secs,
            table: CurrencyTable::new(&config.countries, config.default_currency.clone()),
        }
    }

    /// Resolve the currency for a request's headers.
    pub fn resolve(&self, headers: &HeaderMap) -> CurrencyResolution {
        let existing = self.existing_cookie(headers);
        let country = headers
            .get(self.country_header.as_str())
            .and_then(|v| v.to_str().ok());
        resolve_currency(existing.as_deref(), country, &self.table)
    }

    /// The value of the currency cookie, if the client sent one.
    pub fn existing_cookie(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|c| c.name() == self.cookie_name)
            .map(|c| c.value().to_string())
    }

    /// Build the `Set-Cookie` value for a freshly resolved currency.
    pub fn set_cookie_header(&self, code: &str) -> Option<HeaderValue> {
        let max_age = i64::try_from(self.max_age_secs).unwrap_or(i64::MAX);
        let cookie = Cookie::build((self.cookie_name.as_str(), code))
            .path("/")
            .max_age(cookie::time::Duration::seconds(max_age))
            .secure(true)
            .same_site(SameSite::Lax)
            .build();

        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(code = %code, error = %e, "Currency cookie is not a valid header value");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> CurrencyResolver {
        let mut config = CurrencyConfig::default();
        config.enabled = true;
        config.default_currency = "EUR".into();
        config.countries = [("US", "USD"), ("gb", "GBP")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CurrencyResolver::from_config(&config)
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn existing_cookie_is_never_overwritten() {
        let resolution = resolver().resolve(&headers(&[
            ("cookie", "session=abc; woocs_curr=EUR"),
            ("cf-ipcountry", "US"),
        ]));
        assert_eq!(
            resolution,
            CurrencyResolution {
                code: "EUR".into(),
                should_set: false
            }
        );
    }

    #[test]
    fn cookie_found_across_multiple_headers() {
        let r = resolver();
        let map = headers(&[("cookie", "a=1"), ("cookie", "woocs_curr=GBP")]);
        assert_eq!(r.existing_cookie(&map).as_deref(), Some("GBP"));
    }

    #[test]
    fn country_lookup_is_case_insensitive() {
        let resolution = resolver().resolve(&headers(&[("cf-ipcountry", "gb")]));
        assert_eq!(resolution.code, "GBP");
        assert!(resolution.should_set);

        let resolution = resolver().resolve(&headers(&[("cf-ipcountry", "us")]));
        assert_eq!(resolution.code, "USD");
    }

    #[test]
    fn unknown_or_missing_country_uses_default() {
        assert_eq!(resolver().resolve(&headers(&[("cf-ipcountry", "XX")])).code, "EUR");
        assert_eq!(resolver().resolve(&HeaderMap::new()).code, "EUR");
    }

    #[test]
    fn set_cookie_carries_site_wide_secure_attributes() {
        let value = resolver().set_cookie_header("USD").unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("woocs_curr=USD"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Max-Age=2592000"));
    }
}
