//! # waypost
//!
//! A request router for web applications: URI templates with named
//! parameters, route groups that can be bound and unbound while requests are
//! being served, and reverse routing from handler to URL.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on
//! `waypost` to get everything, or on the individual crates directly.

/// Settings, logging setup, HTTP methods, and error types.
pub use waypost_core as core;

/// Pattern compilation, the route registry, lookup, and reverse routing.
#[cfg(feature = "router")]
pub use waypost_router as router;

pub use waypost_core::logging::setup_logging;
pub use waypost_core::{RouterError, RouterResult, RouterSettings};

#[cfg(feature = "router")]
pub use waypost_router::{Controller, HandlerRef, HttpMethod, MatchResult, RouteBuilder, Router};

pub use tracing;
pub use tracing_subscriber;
