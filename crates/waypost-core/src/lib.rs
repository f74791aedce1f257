//! # waypost-core
//!
//! Core types, settings, and error types for the waypost request router.
//! This crate has no routing logic and provides the foundation for the other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`method`] - The [`HttpMethod`] enumeration routes are keyed by
//! - [`settings`] - Router settings and their TOML / environment loaders
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod method;
pub mod settings;

// Re-export the most commonly used types at the crate root.
pub use error::{CompileError, CompileErrorKind, RouterError, RouterResult};
pub use method::HttpMethod;
pub use settings::{ReversePolicy, RouterSettings};
