//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → embedded in the server's Arc-swapped hot state
//!
//! On file change:
//!     watcher.rs detects the write
//!     → loader.rs loads and validates the new config
//!     → http/server.rs rebuilds its hot state and swaps it in atomically
//!     → in-flight requests finish on the old state
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::GateConfig;
pub use schema::ListenerConfig;
pub use schema::UpstreamConfig;
pub use schema::StoreConfig;
