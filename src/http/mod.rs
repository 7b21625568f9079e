//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (request ID assigned, propagated to the response)
//!     → server.rs (trace span, timeout, security headers, body limit)
//!     → write gate on mutating /api/ calls
//!     → catalog / admin / media handlers, or static files
//! ```

pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
