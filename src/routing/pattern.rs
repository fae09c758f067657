//! Route pattern compilation and full-path matching.
//!
//! # Syntax
//! ```text
//! /shop/products      literal segments, matched exactly (case-sensitive)
//! /shop/*             `*` consumes exactly one segment
//! /shop/**            `**` consumes zero or more segments
//! /blog/:slug         placeholder, consumes one segment
//! /item/:id<[0-9]+>   placeholder with a regex constraint on the whole segment
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at startup; a malformed pattern is a config error
//! - Full-match semantics: no path segment may remain unconsumed
//! - Empty segments (`//`, trailing `/`) are ignored on both sides

use regex::Regex;
use thiserror::Error;

/// Rewrites a placeholder's segment before its constraint is checked.
pub type Transform = fn(&str) -> String;

/// Placeholder values captured by a successful match, in pattern order.
pub type RouteParams = Vec<(String, String)>;

/// Errors raised while compiling a route pattern.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PatternError {
    #[error("pattern {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("pattern {0:?} contains a placeholder without a name")]
    EmptyPlaceholder(String),

    #[error("pattern {pattern:?} has an unterminated constraint for :{name}")]
    UnterminatedConstraint { pattern: String, name: String },

    #[error("pattern {pattern:?} has an invalid constraint for :{name}: {reason}")]
    InvalidConstraint {
        pattern: String,
        name: String,
        reason: String,
    },

    #[error("pattern {pattern:?} declares :{name} more than once")]
    DuplicatePlaceholder { pattern: String, name: String },
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Any,
    Rest,
    Param {
        name: String,
        constraint: Option<Regex>,
        transform: Option<Transform>,
    },
}

/// One compiled `listen_on_paths` entry.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pattern: String,
    segments: Vec<Segment>,
}

impl RouteRule {
    /// Compile a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        }

        let mut segments = Vec::new();
        let mut names: Vec<&str> = Vec::new();

        for raw in pattern.split('/').filter(|s| !s.is_empty()) {
            let segment = match raw {
                "*" => Segment::Any,
                "**" => Segment::Rest,
                _ => match raw.strip_prefix(':') {
                    Some(placeholder) => {
                        let (name, constraint) = parse_placeholder(pattern, placeholder)?;
                        if names.contains(&name) {
                            return Err(PatternError::DuplicatePlaceholder {
                                pattern: pattern.to_string(),
                                name: name.to_string(),
                            });
                        }
                        names.push(name);
                        Segment::Param {
                            name: name.to_string(),
                            constraint,
                            transform: None,
                        }
                    }
                    None => Segment::Literal(raw.to_string()),
                },
            };
            segments.push(segment);
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// Attach a transform to the placeholder called `name`.
    ///
    /// Unknown names are ignored.
    pub fn with_transform(mut self, name: &str, transform: Transform) -> Self {
        for segment in &mut self.segments {
            if let Segment::Param { name: n, transform: t, .. } = segment {
                if n == name {
                    *t = Some(transform);
                }
            }
        }
        self
    }

    /// The pattern as written in the configuration.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the whole path is consumed by this pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }

    /// Match the path and return the placeholder values.
    pub fn captures(&self, path: &str) -> Option<RouteParams> {
        let path: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Vec::new();
        if match_segments(&self.segments, &path, &mut params) {
            Some(params)
        } else {
            None
        }
    }
}

fn parse_placeholder<'a>(
    pattern: &str,
    placeholder: &'a str,
) -> Result<(&'a str, Option<Regex>), PatternError> {
    let (name, constraint) = match placeholder.split_once('<') {
        Some((name, rest)) => {
            let Some(expr) = rest.strip_suffix('>') else {
                return Err(PatternError::UnterminatedConstraint {
                    pattern: pattern.to_string(),
                    name: name.to_string(),
                });
            };
            (name, Some(expr))
        }
        None => (placeholder, None),
    };

    if name.is_empty() {
        return Err(PatternError::EmptyPlaceholder(pattern.to_string()));
    }

    let constraint = constraint
        .map(|expr| {
            Regex::new(&format!("^(?:{expr})$")).map_err(|e| PatternError::InvalidConstraint {
                pattern: pattern.to_string(),
                name: name.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()?;

    Ok((name, constraint))
}

fn match_segments(pattern: &[Segment], path: &[&str], params: &mut RouteParams) -> bool {
    let Some((head, rest)) = pattern.split_first() else {
        return path.is_empty();
    };

    match head {
        Segment::Literal(literal) => {
            path.first() == Some(&literal.as_str()) && match_segments(rest, &path[1..], params)
        }
        Segment::Any => !path.is_empty() && match_segments(rest, &path[1..], params),
        Segment::Rest => {
            let mark = params.len();
            for skip in 0..=path.len() {
                if match_segments(rest, &path[skip..], params) {
                    return true;
                }
                params.truncate(mark);
            }
            false
        }
        Segment::Param {
            name,
            constraint,
            transform,
        } => {
            let Some(raw) = path.first() else {
                return false;
            };
            let value = match transform {
                Some(f) => f(raw),
                None => raw.to_string(),
            };
            if let Some(re) = constraint {
                if !re.is_match(&value) {
                    return false;
                }
            }
            params.push((name.clone(), value));
            if match_segments(rest, &path[1..], params) {
                true
            } else {
                params.pop();
                false
            }
        }
    }
}
