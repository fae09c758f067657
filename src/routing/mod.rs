//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → matcher.rs (unconditional exclusions: method, media, admin)
//!     → router.rs (scope lookup against listen_on_paths)
//!     → pattern.rs (evaluate one compiled pattern)
//!     → Return: in scope or NoMatch
//!
//! Route Compilation (at startup):
//!     listen_on_paths[]
//!     → Parse into segments, compile constraints
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - Any match puts a path in scope

pub mod matcher;
pub mod pattern;
pub mod router;

pub use pattern::{PatternError, RouteRule};
pub use router::{Router, Scope};
