//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Remote store operation:
//!     → retry.rs (invoke, inspect error kind)
//!     → On transient failure: backoff.rs (exponential delay), retry
//!     → On non-transient failure or exhaustion: propagate original error
//! ```
//!
//! # Design Decisions
//! - Only errors tagged transient at their origin are retried
//! - Backoff is deterministic (no jitter) so callers can reason about the
//!   worst-case added latency
//! - The original error is propagated unchanged; retrying never rewrites
//!   the failure

pub mod backoff;
pub mod retry;

pub use retry::Retrier;
