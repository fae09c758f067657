//! Already-prefixed path detection.
//!
//! A path whose first segment is a supported language has already been
//! routed. Redirecting it again would double the prefix or loop.

use crate::language::SupportedLanguages;

/// Returns true if the first path segment is a supported language.
pub fn already_prefixed(path: &str, supported: &SupportedLanguages) -> bool {
    path.split('/')
        .find(|segment| !segment.is_empty())
        .is_some_and(|first| supported.contains(first))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported() -> SupportedLanguages {
        SupportedLanguages::new(["en", "de", "pt-br"])
    }

    #[test]
    fn detects_language_segment() {
        assert!(already_prefixed("/de", &supported()));
        assert!(already_prefixed("/de/", &supported()));
        assert!(already_prefixed("/DE/shop", &supported()));
        assert!(already_prefixed("/pt-BR/loja", &supported()));
    }

    #[test]
    fn ignores_other_segments() {
        assert!(!already_prefixed("/", &supported()));
        assert!(!already_prefixed("", &supported()));
        assert!(!already_prefixed("/shop/de", &supported()));
        assert!(!already_prefixed("/deals", &supported()));
        assert!(!already_prefixed("/fr/boutique", &supported()));
    }
}
