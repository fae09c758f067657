//! Cache key derivation.

use url::Url;

use crate::language::LanguageTag;

/// Key for a request URL answered in `language`.
///
/// The URL is already normalized by parsing (lowercase scheme and host,
/// default port removed). The language lives in the fragment, which
/// clients never send.
pub fn cache_key(url: &Url, language: &LanguageTag) -> String {
    let mut key = url.clone();
    key.set_fragment(Some(&format!("lang={language}")));
    key.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_namespaced_by_language() {
        let url = Url::parse("https://Example.com:443/shop?q=1").unwrap();
        assert_eq!(
            cache_key(&url, &LanguageTag::new("de")),
            "https://example.com/shop?q=1#lang=de"
        );
        assert_ne!(
            cache_key(&url, &LanguageTag::new("de")),
            cache_key(&url, &LanguageTag::new("fr"))
        );
    }
}
