//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, route patterns compiled once)
//!     → ProxyConfig (validated, immutable)
//!     → compiled into the pipeline and shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; never mutated at request time
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CacheConfig, CurrencyConfig, ExclusionConfig, LanguageConfig, ListenerConfig,
    ObservabilityConfig, OriginConfig, ProxyConfig, RedirectConfig, TimeoutConfig,
};
