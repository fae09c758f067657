//! Ordered guard table producing a tagged verdict.
//!
//! ```text
//! scope guards (first hit wins):
//!     method    non GET/HEAD         → Bypass(Method)
//!     media     image/video path     → Bypass(Media)
//!     admin     admin prefix         → Bypass(Admin)
//!     prefixed  /{lang}/...          → Forward(AlreadyPrefixed)
//!     scope     no route matched     → ProbeThenDecide | Forward(OutOfScope)
//!     (none)                         → in scope
//!
//! language guards (in scope or promoted):
//!     header    no Accept-Language   → Forward(NoAcceptLanguage)
//!     default   negotiated default   → Forward(DefaultLanguage)
//!     (none)                         → Redirect(language)
//! ```

use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;

use crate::config::validation::ValidationError;
use crate::config::ProxyConfig;
use crate::language::{already_prefixed, negotiate, LanguageTag, NegotiationResult, SupportedLanguages};
use crate::routing::matcher::{AnyMatcher, ExtensionMatcher, Matcher, NonReadMethodMatcher, PathPrefixMatcher};
use crate::routing::{Router, Scope};

/// Why a request skips the pipeline entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassReason {
    Method,
    Media,
    Admin,
}

/// Why a request is passed through to the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardReason {
    AlreadyPrefixed,
    OutOfScope,
    NoAcceptLanguage,
    DefaultLanguage,
}

/// Tagged outcome of the guard table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Forward untouched: no cache, no cookie.
    Bypass(BypassReason),
    /// Forward to the origin; a currency cookie may be attached.
    Forward(ForwardReason),
    /// Out of scope: ask the origin and promote on 404.
    ProbeThenDecide,
    /// Redirect to the language-prefixed URL.
    Redirect(LanguageTag),
}

impl Verdict {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Bypass(BypassReason::Method) => "bypass_method",
            Verdict::Bypass(BypassReason::Media) => "bypass_media",
            Verdict::Bypass(BypassReason::Admin) => "bypass_admin",
            Verdict::Forward(ForwardReason::AlreadyPrefixed) => "already_prefixed",
            Verdict::Forward(ForwardReason::OutOfScope) => "out_of_scope",
            Verdict::Forward(ForwardReason::NoAcceptLanguage) => "no_accept_language",
            Verdict::Forward(ForwardReason::DefaultLanguage) => "default_language",
            Verdict::ProbeThenDecide => "probe",
            Verdict::Redirect(_) => "redirect",
        }
    }
}

type Guard = fn(&DecisionTable, &Parts) -> Option<Verdict>;

const BYPASS_GUARDS: [(&str, Guard); 3] = [
    ("method", guard_method),
    ("media", guard_media),
    ("admin", guard_admin),
];

const SCOPE_GUARDS: [(&str, Guard); 2] = [("prefixed", guard_prefixed), ("scope", guard_scope)];

/// Compiled decision configuration. Immutable after construction.
#[derive(Debug)]
pub struct DecisionTable {
    default_language: LanguageTag,
    supported: SupportedLanguages,
    router: Router,
    listen_on_prefixed_paths: bool,
    always_on_not_found: bool,
    non_read: NonReadMethodMatcher,
    media: ExtensionMatcher,
    admin: AnyMatcher,
}

impl DecisionTable {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ValidationError> {
        let language = &config.language;
        let default_language = LanguageTag::new(&language.default_language);
        let supported = SupportedLanguages::new(&language.supported_languages);
        if !supported.contains(default_language.as_str()) {
            tracing::warn!(
                default_language = %default_language,
                "Default language is not listed in supported_languages"
            );
        }

        let router = Router::from_config(&language.listen_on_paths, language.listen_on_all_paths)?;
        let media = ExtensionMatcher::new(&config.exclusions.media_extensions)
            .map_err(|e| ValidationError::InvalidExtension(e.to_string()))?;
        let admin = AnyMatcher::new(
            config
                .exclusions
                .admin_prefixes
                .iter()
                .map(|p| Box::new(PathPrefixMatcher::new(p.as_str())) as Box<dyn Matcher>)
                .collect(),
        );

        Ok(Self {
            default_language,
            supported,
            router,
            listen_on_prefixed_paths: language.listen_on_prefixed_paths,
            always_on_not_found: language.always_on_not_found,
            non_read: NonReadMethodMatcher,
            media,
            admin,
        })
    }

    /// Unconditional bypasses, checked before anything else.
    pub fn bypass(&self, parts: &Parts) -> Option<Verdict> {
        run_guards(self, &BYPASS_GUARDS, parts)
    }

    /// Scope guards. `None` means the request is in scope.
    pub fn scope(&self, parts: &Parts) -> Option<Verdict> {
        run_guards(self, &SCOPE_GUARDS, parts)
    }

    /// Negotiate the request's language.
    pub fn negotiate(&self, parts: &Parts) -> NegotiationResult {
        let header = parts.headers.get(ACCEPT_LANGUAGE).map(|value| {
            value.to_str().unwrap_or_else(|_| {
                tracing::debug!("Accept-Language is not visible ASCII, treating as unparsable");
                ""
            })
        });
        negotiate(header, &self.supported, &self.default_language)
    }

    /// Language guards for an in-scope request.
    pub fn language(&self, negotiation: &NegotiationResult) -> Verdict {
        if !negotiation.header_present {
            Verdict::Forward(ForwardReason::NoAcceptLanguage)
        } else if negotiation.wants_redirect(&self.default_language) {
            Verdict::Redirect(negotiation.language.clone())
        } else {
            Verdict::Forward(ForwardReason::DefaultLanguage)
        }
    }
}

fn run_guards(table: &DecisionTable, guards: &[(&str, Guard)], parts: &Parts) -> Option<Verdict> {
    guards.iter().find_map(|(name, guard)| {
        let verdict = guard(table, parts)?;
        tracing::trace!(guard = %name, verdict = verdict.label(), "Guard decided");
        Some(verdict)
    })
}

fn guard_method(table: &DecisionTable, parts: &Parts) -> Option<Verdict> {
    table
        .non_read
        .matches(parts)
        .then_some(Verdict::Bypass(BypassReason::Method))
}

fn guard_media(table: &DecisionTable, parts: &Parts) -> Option<Verdict> {
    table
        .media
        .matches(parts)
        .then_some(Verdict::Bypass(BypassReason::Media))
}

fn guard_admin(table: &DecisionTable, parts: &Parts) -> Option<Verdict> {
    table
        .admin
        .matches(parts)
        .then_some(Verdict::Bypass(BypassReason::Admin))
}

fn guard_prefixed(table: &DecisionTable, parts: &Parts) -> Option<Verdict> {
    if table.listen_on_prefixed_paths {
        return None;
    }
    already_prefixed(parts.uri.path(), &table.supported)
        .then_some(Verdict::Forward(ForwardReason::AlreadyPrefixed))
}

fn guard_scope(table: &DecisionTable, parts: &Parts) -> Option<Verdict> {
    let scope = table.router.lookup(parts.uri.path());
    if let Scope::Matched(pattern) = scope {
        tracing::trace!(pattern = %pattern, "In scope");
    }
    if scope.is_in_scope() {
        None
    } else if table.always_on_not_found {
        Some(Verdict::ProbeThenDecide)
    } else {
        Some(Verdict::Forward(ForwardReason::OutOfScope))
    }
}
