//! Upstream pool subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarded request
//!     → pool.rs (round-robin selection, skip replicas marked down)
//!     → replica.rs (health state machine per replica)
//!     → proxy result feeds back: mark_success / mark_failure
//! ```
//!
//! # Design Decisions
//! - Health is passive only: real traffic is the probe
//! - Consecutive-count thresholds give hysteresis on both transitions
//! - When every replica is down, selection falls back to plain rotation
//!   so recovery traffic still flows

pub mod pool;
pub mod replica;

pub use pool::UpstreamPool;
pub use replica::{HealthState, Replica};
