//! Document-store client subsystem.
//!
//! # Data Flow
//! ```text
//! caller (admin probe, suite services embedding the client)
//!     → client.rs (build request, send via reqwest)
//!     → error.rs (tag failure kind at origin)
//!     → resilience::Retrier (retry transient kinds with backoff)
//!     → caller receives value or the original error
//! ```
//!
//! # Design Decisions
//! - Error kinds are assigned here, where the failure is observed
//! - Document operations run through the retrier; callers never loop
//! - The admin probe is single-attempt so it reports current reachability
//! - User-facing copy lives on the error type, not at call sites

pub mod client;
pub mod error;

pub use client::StoreClient;
pub use error::{StoreError, StoreErrorKind};
