//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (check per-IP limits)
//!     → body size cap (tower-http layer, wired in http/server.rs)
//!     → handler
//! Outgoing response:
//!     → headers.rs (add security response headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input

pub mod headers;
pub mod rate_limit;

pub use rate_limit::RateLimiterState;
