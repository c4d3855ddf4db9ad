//! Route guard subsystem.
//!
//! Evaluates every incoming request before it reaches the page-rendering
//! upstream: classifies the path, reads the identity signals carried in
//! cookies, and decides between forwarding and redirecting.
//!
//! # Data Flow
//! ```text
//! request
//!     → session.rs (cookies → Identity: token, role, status)
//!     → classify.rs (path → RouteClass)
//!     → decision.rs (Identity × RouteClass → Decision)
//!     → middleware.rs
//!         Forward  → next layer (upstream proxy)
//!         Redirect → 307 + Location, upstream never sees the request
//! ```
//!
//! # Design Decisions
//! - The guard is pure: no I/O, no shared state, never errors
//! - Unknown role/status values degrade to lowest privilege, never to bypass
//! - Precedence is fixed: bypass → public set → auth → role → status

pub mod classify;
pub mod decision;
pub mod middleware;
pub mod session;

pub use classify::RouteClass;
pub use decision::{Decision, RedirectTarget};
pub use session::Identity;
