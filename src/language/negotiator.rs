//! Accept-Language negotiation.
//!
//! Based on:
//! - https://httpwg.org/specs/rfc9110.html#field.accept-language
//!
//! # Algorithm
//! 1. No header: default language, flagged as absent
//! 2. Highest-quality entry whose full tag is supported
//! 3. Nothing found, or found the default: strip `xx-YY` regions and retry
//! 4. Still nothing: default language
//!
//! Plain best-quality matching prefers a default-language region variant
//! (`en-GB`) over a supported language listed after it. The retry lets
//! `de-DE,en;q=0.9` resolve to `de` when `de` is supported.
//!
//! Only strict two-letter/two-letter tags are stripped. Three-letter codes
//! and script subtags (`zh-Hant-TW`) stay unparsable on retry.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::language::{LanguageTag, SupportedLanguages};

static REGION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z]{2})-[A-Za-z]{2}\b").expect("region pattern is valid")
});

/// The language chosen for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationResult {
    /// Chosen language, the default when nothing matched.
    pub language: LanguageTag,
    /// Whether the request carried an Accept-Language header at all.
    pub header_present: bool,
}

impl NegotiationResult {
    fn absent(default: &LanguageTag) -> Self {
        Self {
            language: default.clone(),
            header_present: false,
        }
    }

    /// True when the outcome asks for a language other than the default.
    pub fn wants_redirect(&self, default: &LanguageTag) -> bool {
        self.header_present && self.language != *default
    }
}

/// Pick the best supported language for an Accept-Language value.
pub fn negotiate(
    header: Option<&str>,
    supported: &SupportedLanguages,
    default: &LanguageTag,
) -> NegotiationResult {
    let Some(header) = header else {
        return NegotiationResult::absent(default);
    };

    let first = pick(header, supported);
    let language = match first {
        Some(tag) if tag != *default => tag,
        first => {
            let stripped = strip_regions(header);
            tracing::trace!(header = %header, stripped = %stripped, "Retrying negotiation without regions");
            match pick(&stripped, supported) {
                Some(tag) => tag,
                None => first.unwrap_or_else(|| default.clone()),
            }
        }
    };

    NegotiationResult {
        language,
        header_present: true,
    }
}

/// Reduce every `xx-YY` entry in a raw header to `xx`.
pub fn strip_regions(header: &str) -> Cow<'_, str> {
    REGION_SUFFIX.replace_all(header, "$1")
}

fn pick(header: &str, supported: &SupportedLanguages) -> Option<LanguageTag> {
    let mut accepted: Option<(&LanguageTag, f32)> = None;

    for entry in header.split(',') {
        let Some((language, quality)) = parse_entry(entry) else {
            continue;
        };

        if quality <= 0.0 {
            continue;
        }

        let Some(tag) = supported.find(language) else {
            continue;
        };

        accepted = match accepted {
            Some((_, accepted_quality)) if accepted_quality >= quality => accepted,
            _ => Some((tag, quality)),
        };
    }

    accepted.map(|(tag, _)| tag.clone())
}

fn parse_entry(entry: &str) -> Option<(&str, f32)> {
    let mut parts = entry.split(';').map(str::trim);
    let language = parts.next()?;

    if language.is_empty() || language == "*" {
        return None;
    }

    let mut quality = 1.0;
    for param in parts {
        let Some(value) = param.strip_prefix("q=").or_else(|| param.strip_prefix("Q=")) else {
            continue;
        };
        match value.trim().parse::<f32>() {
            Ok(q) if (0.0..=1.0).contains(&q) => quality = q,
            _ => {
                tracing::debug!(entry = %entry, "Skipping Accept-Language entry with invalid quality");
                return None;
            }
        }
    }

    Some((language, quality))
}
