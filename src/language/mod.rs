//! Language subsystem.
//!
//! # Data Flow
//! ```text
//! Accept-Language header
//!     → negotiator.rs (best supported tag, region-stripping retry)
//!     → NegotiationResult
//!
//! Request path
//!     → prefix.rs (first segment already a supported language?)
//! ```

pub mod negotiator;
pub mod prefix;

use std::fmt;
use std::sync::Arc;

pub use negotiator::{negotiate, NegotiationResult};
pub use prefix::already_prefixed;

/// A lowercase language code such as `de` or `pt-br`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag(Arc<str>);

impl LanguageTag {
    pub fn new(tag: &str) -> Self {
        Self(Arc::from(tag.trim().to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw tag.
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The ordered set of languages that may be redirected to.
///
/// Duplicates are tolerated; the first occurrence keeps its position.
#[derive(Debug, Clone, Default)]
pub struct SupportedLanguages {
    tags: Vec<LanguageTag>,
}

impl SupportedLanguages {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for tag in tags {
            let tag = LanguageTag::new(tag.as_ref());
            if !set.tags.contains(&tag) {
                set.tags.push(tag);
            }
        }
        set
    }

    /// Find the supported tag equal to `raw`, ignoring case.
    pub fn find(&self, raw: &str) -> Option<&LanguageTag> {
        self.tags.iter().find(|t| t.eq_ignore_case(raw))
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.find(raw).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageTag> {
        self.tags.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_lowercased() {
        assert_eq!(LanguageTag::new(" DE ").as_str(), "de");
        assert!(LanguageTag::new("pt-BR").eq_ignore_case("PT-br"));
    }

    #[test]
    fn duplicates_are_tolerated() {
        let set = SupportedLanguages::new(["en", "de", "EN", "fr", "de"]);
        let tags: Vec<&str> = set.iter().map(|t| t.as_str()).collect();
        assert_eq!(tags, vec!["en", "de", "fr"]);
        assert!(set.contains("De"));
        assert!(!set.contains("es"));
    }
}
