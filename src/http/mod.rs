//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout)
//!     → request.rs (request ID, public URL reconstruction)
//!     → [pipeline decides]
//!     → origin.rs (forward to the website) | response.rs (302, cookies)
//!     → Send to client
//! ```

pub mod origin;
pub mod request;
pub mod response;
pub mod server;

pub use origin::{HyperOrigin, Origin, OriginError};
pub use request::X_REQUEST_ID;
pub use server::{HttpServer, StartupError};
