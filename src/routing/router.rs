//! Route scope lookup.
//!
//! # Responsibilities
//! - Store compiled route rules
//! - Decide whether a path is in scope
//! - Return the rule that matched, or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in configured order; any match suffices, first match reported
//! - `listen_on_all_paths` short-circuits the scan

use crate::routing::pattern::{PatternError, RouteRule};

/// Outcome of a scope lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Every path is in scope.
    AllPaths,
    /// The named pattern matched.
    Matched(&'a str),
    /// No configured pattern matched.
    NoMatch,
}

impl Scope<'_> {
    pub fn is_in_scope(&self) -> bool {
        !matches!(self, Scope::NoMatch)
    }
}

/// Compiled `listen_on_paths` table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    rules: Vec<RouteRule>,
    listen_on_all_paths: bool,
}

impl Router {
    /// Compile the configured patterns.
    pub fn from_config<S: AsRef<str>>(
        patterns: &[S],
        listen_on_all_paths: bool,
    ) -> Result<Self, PatternError> {
        let rules = if listen_on_all_paths {
            Vec::new()
        } else {
            patterns
                .iter()
                .map(|p| RouteRule::parse(p.as_ref()))
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(Self::new(rules, listen_on_all_paths))
    }

    pub fn new(rules: Vec<RouteRule>, listen_on_all_paths: bool) -> Self {
        Self {
            rules,
            listen_on_all_paths,
        }
    }

    /// Find the scope of a request path.
    pub fn lookup(&self, path: &str) -> Scope<'_> {
        if self.listen_on_all_paths {
            return Scope::AllPaths;
        }

        for rule in &self.rules {
            let matched = rule.matches(path);
            tracing::trace!(pattern = %rule.pattern(), path = %path, matched, "Route pattern tried");
            if matched {
                return Scope::Matched(rule.pattern());
            }
        }

        Scope::NoMatch
    }
}
