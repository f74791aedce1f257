//! # waypost-router
//!
//! The request router: maps an HTTP method and path to a bound handler,
//! extracts path parameters, and turns a handler plus parameter values back
//! into a URL.
//!
//! - [`pattern`]: URI template compilation (`/foo/{id}`, `/files/{path+}`, `/assets/*`)
//! - [`route`]: Routes, handler references, and the route builder
//! - [`registry`]: The copy-on-write route table and bind/unbind
//! - [`matcher`]: Lookup and [`MatchResult`]
//! - [`reverse`]: Reverse URL generation
//! - [`router`]: The [`Router`] facade used by hosting applications
//!
//! # Examples
//!
//! ```
//! use waypost_router::{HandlerRef, HttpMethod, RouteBuilder, Router};
//!
//! let router = Router::new();
//! let show = HandlerRef::new("todo", "show");
//! router
//!     .bind("todo", vec![
//!         RouteBuilder::new().route(HttpMethod::Get).on("/todo/tasks/{id}").to(show.clone()),
//!     ])
//!     .unwrap();
//!
//! // Forward resolution
//! let m = router.lookup(HttpMethod::Get, "/todo/tasks/42");
//! assert_eq!(m.param("id"), Some("42"));
//!
//! // Reverse resolution
//! let url = router.reverse_url_pairs(&show, &[("id", "42")]).unwrap();
//! assert_eq!(url, "/todo/tasks/42");
//! ```

pub mod matcher;
pub mod pattern;
pub mod registry;
pub mod reverse;
pub mod route;
pub mod router;

pub use matcher::MatchResult;
pub use pattern::{PathParams, Priority, Specificity, UriPattern};
pub use registry::{RouteRegistry, RouteTable};
pub use route::{HandlerRef, OwnerId, Route, RouteBuilder, RouteDefinition};
pub use router::{Controller, Router};
pub use waypost_core::{HttpMethod, ReversePolicy, RouterError, RouterResult, RouterSettings};
