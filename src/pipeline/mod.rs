//! Request decision pipeline.
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → decision.rs (guard table → Verdict)
//!     → passthrough.rs (origin 404 probe for out-of-scope paths)
//!     → orchestrator.rs (cache, redirect or passthrough, currency cookie)
//!     → Response<Body>
//! ```

pub mod decision;
pub mod orchestrator;
pub mod passthrough;

pub use decision::{BypassReason, DecisionTable, ForwardReason, Verdict};
pub use orchestrator::Orchestrator;
pub use passthrough::{probe, ProbeOutcome};
