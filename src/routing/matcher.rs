//! Request exclusion matchers.
//!
//! # Responsibilities
//! - Match non read-only methods
//! - Match media file extensions (case-insensitive)
//! - Match administrative path prefixes (case-sensitive)
//!
//! # Design Decisions
//! - Matchers look at request parts only, never the body
//! - Extension matching compiles one regex at startup
//! - Prefix matching respects segment boundaries

use axum::http::request::Parts;
use axum::http::Method;
use regex::Regex;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, parts: &Parts) -> bool;
}

/// Matches every method other than GET and HEAD.
#[derive(Debug, Clone, Default)]
pub struct NonReadMethodMatcher;

impl Matcher for NonReadMethodMatcher {
    fn matches(&self, parts: &Parts) -> bool {
        parts.method != Method::GET && parts.method != Method::HEAD
    }
}

/// Matches paths ending in one of a set of file extensions.
#[derive(Debug, Clone)]
pub struct ExtensionMatcher {
    pattern: Option<Regex>,
}

impl ExtensionMatcher {
    /// Create a matcher for the given extensions (without the dot).
    pub fn new<I, S>(extensions: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = extensions
            .into_iter()
            .map(|e| regex::escape(e.as_ref()))
            .collect();
        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }
        let pattern = Regex::new(&format!(r"(?i)\.(?:{})$", alternatives.join("|")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Returns true if the path ends with a matched extension.
    pub fn matches_path(&self, path: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(path))
    }
}

impl Matcher for ExtensionMatcher {
    fn matches(&self, parts: &Parts) -> bool {
        self.matches_path(parts.uri.path())
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns true if `path` is the prefix itself or continues it with `/`.
    pub fn matches_path(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/'),
            None => false,
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, parts: &Parts) -> bool {
        self.matches_path(parts.uri.path())
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug, Default)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, parts: &Parts) -> bool {
        self.matchers.iter().any(|m| m.matches(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    fn parts(method: Method, uri: &str) -> Parts {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn test_method_matcher() {
        let matcher = NonReadMethodMatcher;
        assert!(!matcher.matches(&parts(Method::GET, "/")));
        assert!(!matcher.matches(&parts(Method::HEAD, "/")));
        assert!(matcher.matches(&parts(Method::POST, "/")));
        assert!(matcher.matches(&parts(Method::OPTIONS, "/")));
    }

    #[test]
    fn test_extension_matcher() {
        let matcher = ExtensionMatcher::new(["jpg", "mp4"]).unwrap();
        assert!(matcher.matches(&parts(Method::GET, "/img/cat.jpg")));
        assert!(matcher.matches(&parts(Method::GET, "/img/CAT.JPG")));
        assert!(matcher.matches(&parts(Method::GET, "/v/clip.mp4?t=3")));
        assert!(!matcher.matches(&parts(Method::GET, "/img/cat.jpg.html")));
        assert!(!matcher.matches(&parts(Method::GET, "/about")));
    }

    #[test]
    fn test_empty_extension_list_never_matches() {
        let matcher = ExtensionMatcher::new(Vec::<String>::new()).unwrap();
        assert!(!matcher.matches_path("/a.jpg"));
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/wp-admin");
        assert!(matcher.matches(&parts(Method::GET, "http://example.com/wp-admin")));
        assert!(matcher.matches(&parts(Method::GET, "/wp-admin/options.php")));
        assert!(!matcher.matches(&parts(Method::GET, "/wp-administrator")));
        assert!(!matcher.matches(&parts(Method::GET, "/shop")));

        let file = PathPrefixMatcher::new("/wp-login.php");
        assert!(file.matches_path("/wp-login.php"));
    }

    #[test]
    fn test_any_matcher() {
        let matcher = AnyMatcher::new(vec![
            Box::new(PathPrefixMatcher::new("/a")),
            Box::new(PathPrefixMatcher::new("/b")),
        ]);
        assert!(matcher.matches(&parts(Method::GET, "/b/x")));
        assert!(!matcher.matches(&parts(Method::GET, "/c")));
    }
}
