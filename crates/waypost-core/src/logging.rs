//! Logging integration for the waypost router.
//!
//! The router emits [`tracing`] events: `info` for bind/unbind, `debug` per
//! route, `warn` for rejected batches and `trace` for individual lookups.
//! Hosts that do not install their own subscriber can use [`setup_logging`].

use crate::settings::RouterSettings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level`. In debug mode a pretty,
/// human-readable format is used; otherwise a structured JSON format is used.
/// Calling this when a subscriber is already installed does nothing.
pub fn setup_logging(settings: &RouterSettings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for a named router instance.
///
/// # Examples
///
/// ```
/// use waypost_core::logging::router_span;
///
/// let span = router_span("admin");
/// let _guard = span.enter();
/// tracing::info!("binding admin routes");
/// ```
pub fn router_span(name: &str) -> tracing::Span {
    tracing::info_span!("router", name = name)
}
