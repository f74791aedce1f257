//! The [`Router`] facade.
//!
//! This is the surface hosting applications use: controllers are bound and
//! unbound as they come and go, the transport calls [`Router::lookup`] once
//! per request, and link generation calls [`Router::reverse_url`].

use std::sync::Arc;

use waypost_core::{HttpMethod, RouterResult, RouterSettings};

use crate::matcher::MatchResult;
use crate::registry::{RouteRegistry, RouteTable};
use crate::route::{HandlerRef, OwnerId, Route, RouteDefinition};

/// A component that declares a group of routes.
///
/// Implement this on controllers to bind them with
/// [`Router::bind_controller`] when they activate and remove them with
/// [`Router::unbind_controller`] when they go away.
pub trait Controller {
    /// The owner id the controller's routes are bound under.
    fn owner_id(&self) -> OwnerId;

    /// The controller's route declarations.
    fn routes(&self) -> Vec<RouteDefinition>;
}

/// The request router.
///
/// All methods take `&self`; share the router between threads with an `Arc`.
/// Lookups and reverse resolution never block on bind/unbind.
#[derive(Debug, Default)]
pub struct Router {
    registry: RouteRegistry,
    settings: RouterSettings,
}

impl Router {
    /// Creates a router with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router with the given settings.
    pub fn with_settings(settings: RouterSettings) -> Self {
        Self {
            registry: RouteRegistry::new(),
            settings,
        }
    }

    /// Returns the router settings.
    pub const fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Binds a group of routes for `owner`, replacing any group it bound before.
    ///
    /// # Errors
    ///
    /// Fails without changing anything if a template does not compile or a
    /// handler is already bound elsewhere. See [`RouteRegistry::bind`].
    pub fn bind<I>(&self, owner: impl Into<OwnerId>, routes: I) -> RouterResult<usize>
    where
        I: IntoIterator<Item = RouteDefinition>,
    {
        self.registry
            .bind(owner.into(), routes.into_iter().collect())
    }

    /// Removes every route bound by `owner`. Returns how many were removed;
    /// unbinding an unknown owner returns 0.
    pub fn unbind(&self, owner: impl Into<OwnerId>) -> usize {
        self.registry.unbind(&owner.into())
    }

    /// Binds the routes declared by `controller`.
    ///
    /// # Errors
    ///
    /// See [`Router::bind`].
    pub fn bind_controller(&self, controller: &dyn Controller) -> RouterResult<usize> {
        self.bind(controller.owner_id(), controller.routes())
    }

    /// Unbinds the routes previously bound for `controller`.
    pub fn unbind_controller(&self, controller: &dyn Controller) -> usize {
        self.unbind(controller.owner_id())
    }

    /// Resolves a request to a route.
    ///
    /// `raw_path` may carry a query string or fragment; with
    /// `strip_query` enabled (the default) they are ignored.
    pub fn lookup(&self, method: HttpMethod, raw_path: &str) -> MatchResult {
        self.registry
            .snapshot()
            .lookup(method, self.request_path(raw_path))
    }

    /// Generates the URL for `handler` from named parameter values.
    ///
    /// Values not used by the template are handled according to
    /// `settings.reverse_policy`.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::reverse_url`].
    pub fn reverse_url<I, K, V>(&self, handler: &HandlerRef, params: I) -> RouterResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.registry
            .snapshot()
            .reverse_url(handler, params, self.settings.reverse_policy)
    }

    /// Like [`Router::reverse_url`] with key/value pairs.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::reverse_url`].
    pub fn reverse_url_pairs(
        &self,
        handler: &HandlerRef,
        params: &[(&str, &str)],
    ) -> RouterResult<String> {
        self.reverse_url(handler, params.iter().copied())
    }

    /// Returns the methods that have a route matching `raw_path`.
    ///
    /// Useful for answering `405 Method Not Allowed` with an `Allow` header.
    pub fn allowed_methods(&self, raw_path: &str) -> Vec<HttpMethod> {
        self.registry
            .snapshot()
            .allowed_methods(self.request_path(raw_path))
    }

    /// Returns the current route table snapshot.
    ///
    /// Every query against one snapshot sees the same registry state.
    pub fn snapshot(&self) -> Arc<RouteTable> {
        self.registry.snapshot()
    }

    /// Returns every bound route, by method and dispatch order.
    pub fn routes(&self) -> Vec<Arc<Route>> {
        self.registry.snapshot().routes()
    }

    /// Returns the routes bound for `method`, in dispatch order.
    pub fn routes_for(&self, method: HttpMethod) -> Vec<Arc<Route>> {
        self.registry.snapshot().routes_for(method).to_vec()
    }

    /// Returns the route bound to `handler`, if any.
    pub fn route_for_handler(&self, handler: &HandlerRef) -> Option<Arc<Route>> {
        self.registry.snapshot().route_for_handler(handler).cloned()
    }

    /// Returns the ids of every bound owner, sorted.
    pub fn owners(&self) -> Vec<OwnerId> {
        self.registry.snapshot().owners()
    }

    /// Returns `true` if `owner` has a bound group.
    pub fn is_bound(&self, owner: impl Into<OwnerId>) -> bool {
        self.registry.snapshot().is_bound(&owner.into())
    }

    /// Returns the number of bound routes.
    pub fn len(&self) -> usize {
        self.registry.snapshot().len()
    }

    /// Returns `true` if no route is bound.
    pub fn is_empty(&self) -> bool {
        self.registry.snapshot().is_empty()
    }

    fn request_path<'a>(&self, raw_path: &'a str) -> &'a str {
        if self.settings.strip_query {
            raw_path
                .find(|c| c == '?' || c == '#')
                .map_or(raw_path, |end| &raw_path[..end])
        } else {
            raw_path
        }
    }
}
