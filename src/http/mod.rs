//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, hot state)
//!     → request.rs (request ID assignment)
//!     → [guard decides: forward / redirect]
//!     → logout.rs (/logout terminates here)
//!     → forward.rs (everything else streams to a replica)
//! ```

pub mod forward;
pub mod logout;
pub mod request;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
