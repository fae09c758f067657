//! Edge language-redirect interceptor.
//!
//! Sits in front of a multilingual website, negotiates `Accept-Language`
//! and answers with a `302` to the language-prefixed URL, or passes the
//! request through to the origin. Optionally assigns a currency cookie
//! from the visitor's country.

// Core subsystems
pub mod config;
pub mod http;
pub mod pipeline;
pub mod routing;

// Decision inputs
pub mod currency;
pub mod language;

// Cross-cutting concerns
pub mod cache;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
