//! Forward resolution: method + path to a bound route.

use std::sync::Arc;

use tracing::trace;

use waypost_core::HttpMethod;

use crate::pattern::{normalize_path, PathParams};
use crate::registry::RouteTable;
use crate::route::{HandlerRef, Route};

/// The outcome of a lookup.
///
/// `Unbound` is the ordinary "no route matched" outcome, not an error:
/// mapping it to a not-found response is the caller's business.
#[derive(Debug, Clone)]
pub enum MatchResult {
    /// A route matched; `params` holds the decoded path parameters.
    Bound {
        /// The matched route.
        route: Arc<Route>,
        /// Parameters captured from the path, keyed by placeholder name.
        params: PathParams,
    },
    /// No route bound for the method matches the path.
    Unbound,
}

impl MatchResult {
    /// Returns `true` if no route matched.
    pub const fn is_unbound(&self) -> bool {
        matches!(self, Self::Unbound)
    }

    /// Returns `true` if a route matched.
    pub const fn is_bound(&self) -> bool {
        !self.is_unbound()
    }

    /// Returns the matched route.
    pub const fn route(&self) -> Option<&Arc<Route>> {
        match self {
            Self::Bound { route, .. } => Some(route),
            Self::Unbound => None,
        }
    }

    /// Returns the handler of the matched route.
    pub fn handler(&self) -> Option<&HandlerRef> {
        self.route().map(|route| route.handler())
    }

    /// Returns the extracted path parameters.
    pub const fn path_parameters(&self) -> Option<&PathParams> {
        match self {
            Self::Bound { params, .. } => Some(params),
            Self::Unbound => None,
        }
    }

    /// Returns a single path parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_parameters()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }

    /// Consumes the result, returning the route and its parameters.
    pub fn into_parts(self) -> Option<(Arc<Route>, PathParams)> {
        match self {
            Self::Bound { route, params } => Some((route, params)),
            Self::Unbound => None,
        }
    }
}

impl RouteTable {
    /// Finds the first route for `method`, in dispatch order, whose template
    /// matches `path`.
    ///
    /// `path` is the request path only; strip any query string first.
    pub fn lookup(&self, method: HttpMethod, path: &str) -> MatchResult {
        let canonical = normalize_path(path);
        for route in self.routes_for(method) {
            if let Some(params) = route.pattern().captures(&canonical) {
                trace!(%method, path, template = route.template(), "route matched");
                return MatchResult::Bound {
                    route: Arc::clone(route),
                    params,
                };
            }
        }
        trace!(%method, path, "no route matched");
        MatchResult::Unbound
    }

    /// Returns every method with at least one route matching `path`.
    pub fn allowed_methods(&self, path: &str) -> Vec<HttpMethod> {
        let canonical = normalize_path(path);
        HttpMethod::ALL
            .into_iter()
            .filter(|method| {
                self.routes_for(*method)
                    .iter()
                    .any(|route| route.pattern().is_match(&canonical))
            })
            .collect()
    }
}
