//! The route registry.
//!
//! [`RouteRegistry`] owns the currently published [`RouteTable`]. Tables are
//! immutable: `bind` and `unbind` build a new table from the current one and
//! publish it with a single atomic swap, so readers never take a lock and
//! never observe a half-applied batch. Writers serialize on a mutex, which
//! also guards the registration sequence counter.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use waypost_core::{HttpMethod, RouterError, RouterResult};

use crate::route::{HandlerRef, OwnerId, Route, RouteDefinition};

/// An immutable snapshot of every bound route.
///
/// Per-method route lists are sorted by dispatch order: [`Priority`] first,
/// then registration order.
///
/// [`Priority`]: crate::pattern::Priority
#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    by_method: HashMap<HttpMethod, Arc<[Arc<Route>]>>,
    by_handler: HashMap<HandlerRef, Arc<Route>>,
    by_owner: HashMap<OwnerId, Vec<HandlerRef>>,
    generation: u64,
}

impl RouteTable {
    /// Returns the routes bound for `method`, in dispatch order.
    pub fn routes_for(&self, method: HttpMethod) -> &[Arc<Route>] {
        match self.by_method.get(&method) {
            Some(routes) => routes,
            None => &[],
        }
    }

    /// Returns the route bound to `handler`, if any.
    pub fn route_for_handler(&self, handler: &HandlerRef) -> Option<&Arc<Route>> {
        self.by_handler.get(handler)
    }

    /// Returns every bound route, grouped by method and in dispatch order
    /// within each method.
    pub fn routes(&self) -> Vec<Arc<Route>> {
        let mut methods: Vec<&HttpMethod> = self.by_method.keys().collect();
        methods.sort();
        methods
            .into_iter()
            .flat_map(|m| self.routes_for(*m).iter().cloned())
            .collect()
    }

    /// Returns the routes bound by `owner`, in the order they were declared.
    pub fn routes_of(&self, owner: &OwnerId) -> Vec<Arc<Route>> {
        self.by_owner.get(owner).map_or_else(Vec::new, |handlers| {
            handlers
                .iter()
                .filter_map(|h| self.by_handler.get(h).cloned())
                .collect()
        })
    }

    /// Returns the ids of every bound owner, sorted.
    pub fn owners(&self) -> Vec<OwnerId> {
        let mut owners: Vec<OwnerId> = self.by_owner.keys().cloned().collect();
        owners.sort();
        owners
    }

    /// Returns `true` if `owner` currently has a bound group.
    pub fn is_bound(&self, owner: &OwnerId) -> bool {
        self.by_owner.contains_key(owner)
    }

    /// Returns the number of bound routes.
    pub fn len(&self) -> usize {
        self.by_handler.len()
    }

    /// Returns `true` if no route is bound.
    pub fn is_empty(&self) -> bool {
        self.by_handler.is_empty()
    }

    /// Returns how many times a table has been published before this one.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns a copy of this table with every route of `owner` removed.
    fn without_owner(&self, owner: &OwnerId) -> Self {
        let mut table = self.clone();
        let Some(handlers) = table.by_owner.remove(owner) else {
            return table;
        };

        let mut methods = HashSet::new();
        for handler in &handlers {
            if let Some(route) = table.by_handler.remove(handler) {
                debug!(
                    method = %route.method(),
                    template = route.template(),
                    handler = %handler,
                    "route unbound"
                );
                methods.insert(route.method());
            }
        }

        for method in methods {
            let remaining: Vec<Arc<Route>> = table
                .routes_for(method)
                .iter()
                .filter(|r| r.owner() != owner)
                .cloned()
                .collect();
            if remaining.is_empty() {
                table.by_method.remove(&method);
            } else {
                table.by_method.insert(method, remaining.into());
            }
        }
        table
    }
}

/// The mutable collection of bound routes.
///
/// # Examples
///
/// ```
/// use waypost_router::registry::RouteRegistry;
/// use waypost_router::{HandlerRef, HttpMethod, OwnerId, RouteDefinition};
///
/// let registry = RouteRegistry::new();
/// let owner = OwnerId::new("blog");
/// registry
///     .bind(owner.clone(), vec![RouteDefinition::new(
///         HttpMethod::Get,
///         "/posts/{id}",
///         HandlerRef::new("blog", "show"),
///     )])
///     .unwrap();
/// assert_eq!(registry.snapshot().len(), 1);
///
/// registry.unbind(&owner);
/// assert!(registry.snapshot().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct RouteRegistry {
    table: ArcSwap<RouteTable>,
    /// Held by writers for the whole read-modify-publish cycle
    next_seq: Mutex<u64>,
}

impl RouteRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently published table.
    ///
    /// The snapshot stays valid and unchanged for as long as the caller keeps it.
    pub fn snapshot(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Binds a group of routes for `owner` and returns how many were bound.
    ///
    /// The batch is all-or-nothing: every template is compiled before
    /// anything is published. If `owner` is already bound, its previous group
    /// is replaced by this one in the same swap.
    ///
    /// # Errors
    ///
    /// - [`RouterError::Compile`] if any template is malformed.
    /// - [`RouterError::DuplicateHandler`] if a handler appears twice in the
    ///   batch or is already bound by another owner.
    ///
    /// In both cases the registry is left unchanged.
    pub fn bind(&self, owner: OwnerId, definitions: Vec<RouteDefinition>) -> RouterResult<usize> {
        let routes = definitions
            .into_iter()
            .map(|definition| Route::compile(definition, owner.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                warn!(owner = %owner, template = %e.template, error = %e, "rejecting route group");
                RouterError::from(e)
            })?;

        let mut next_seq = self.next_seq.lock();
        let current = self.table.load_full();

        check_handlers(&current, &owner, &routes).map_err(|e| {
            warn!(owner = %owner, error = %e, "rejecting route group");
            e
        })?;

        let mut table = current.without_owner(&owner);
        let count = routes.len();
        let mut seq = *next_seq;
        let mut handlers = Vec::with_capacity(count);
        let mut added: HashMap<HttpMethod, Vec<Arc<Route>>> = HashMap::new();

        for route in routes {
            let route = Arc::new(route.sequenced(seq));
            seq += 1;
            debug!(
                method = %route.method(),
                template = route.template(),
                handler = %route.handler(),
                "route bound"
            );
            handlers.push(route.handler().clone());
            table
                .by_handler
                .insert(route.handler().clone(), Arc::clone(&route));
            added.entry(route.method()).or_default().push(route);
        }

        for (method, new_routes) in added {
            let mut merged = table.routes_for(method).to_vec();
            merged.extend(new_routes);
            merged.sort_by_key(|r| r.order_key());
            table.by_method.insert(method, merged.into());
        }

        table.by_owner.insert(owner.clone(), handlers);
        table.generation = current.generation + 1;
        self.table.store(Arc::new(table));
        *next_seq = seq;

        info!(owner = %owner, routes = count, "route group bound");
        Ok(count)
    }

    /// Removes every route bound by `owner` and returns how many were removed.
    ///
    /// Unbinding an owner that is not bound is a no-op that returns 0.
    pub fn unbind(&self, owner: &OwnerId) -> usize {
        let _writer = self.next_seq.lock();
        let current = self.table.load_full();

        let Some(removed) = current.by_owner.get(owner).map(Vec::len) else {
            debug!(owner = %owner, "unbind ignored, owner not bound");
            return 0;
        };

        let mut table = current.without_owner(owner);
        table.generation = current.generation + 1;
        self.table.store(Arc::new(table));

        info!(owner = %owner, routes = removed, "route group unbound");
        removed
    }
}

/// Rejects batches whose handlers collide with each other or with handlers
/// bound by another owner.
fn check_handlers(current: &RouteTable, owner: &OwnerId, routes: &[Route]) -> RouterResult<()> {
    let replaced: HashSet<&HandlerRef> = current
        .by_owner
        .get(owner)
        .map(|handlers| handlers.iter().collect())
        .unwrap_or_default();

    let mut seen = HashSet::with_capacity(routes.len());
    for route in routes {
        let handler = route.handler();
        let taken = current.by_handler.contains_key(handler) && !replaced.contains(handler);
        if !seen.insert(handler) || taken {
            return Err(RouterError::DuplicateHandler {
                handler: handler.to_string(),
                template: route.template().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(method: HttpMethod, template: &str, action: &str) -> RouteDefinition {
        RouteDefinition::new(method, template, HandlerRef::new("ctrl", action))
    }

    fn templates(table: &RouteTable, method: HttpMethod) -> Vec<String> {
        table
            .routes_for(method)
            .iter()
            .map(|r| r.template().to_string())
            .collect()
    }

    #[test]
    fn test_bind_publishes_routes() {
        let registry = RouteRegistry::new();
        let n = registry
            .bind(
                OwnerId::new("a"),
                vec![
                    def(HttpMethod::Get, "/foo", "foo"),
                    def(HttpMethod::Post, "/foo", "create"),
                ],
            )
            .unwrap();
        assert_eq!(n, 2);

        let table = registry.snapshot();
        assert_eq!(table.len(), 2);
        assert_eq!(templates(&table, HttpMethod::Get), vec!["/foo"]);
        assert_eq!(templates(&table, HttpMethod::Post), vec!["/foo"]);
        assert!(table.routes_for(HttpMethod::Put).is_empty());
        assert!(table.is_bound(&OwnerId::new("a")));
    }

    #[test]
    fn test_routes_sorted_by_priority_then_registration() {
        let registry = RouteRegistry::new();
        registry
            .bind(
                OwnerId::new("a"),
                vec![
                    def(HttpMethod::Get, "/{all+}", "all"),
                    def(HttpMethod::Get, "/foo/{id}", "show"),
                    def(HttpMethod::Get, "/foo/*", "sub"),
                    def(HttpMethod::Get, "/bar/{id}", "bar"),
                ],
            )
            .unwrap();
        registry
            .bind(OwnerId::new("b"), vec![def(HttpMethod::Get, "/foo/bar", "lit")])
            .unwrap();

        let table = registry.snapshot();
        assert_eq!(
            templates(&table, HttpMethod::Get),
            vec!["/foo/bar", "/foo/{id}", "/bar/{id}", "/foo/*", "/{all+}"]
        );
    }

    #[test]
    fn test_bind_is_atomic_on_compile_error() {
        let registry = RouteRegistry::new();
        let err = registry
            .bind(
                OwnerId::new("a"),
                vec![
                    def(HttpMethod::Get, "/ok", "ok"),
                    def(HttpMethod::Get, "/bad/{x}/{x}", "bad"),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, RouterError::Compile(_)));

        let table = registry.snapshot();
        assert!(table.is_empty());
        assert!(!table.is_bound(&OwnerId::new("a")));
        assert_eq!(table.generation(), 0);
    }

    #[test]
    fn test_duplicate_handler_within_batch() {
        let registry = RouteRegistry::new();
        let err = registry
            .bind(
                OwnerId::new("a"),
                vec![
                    def(HttpMethod::Get, "/one", "same"),
                    def(HttpMethod::Post, "/two", "same"),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, RouterError::DuplicateHandler { ref template, .. } if template == "/two"));
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_duplicate_handler_across_owners() {
        let registry = RouteRegistry::new();
        registry
            .bind(OwnerId::new("a"), vec![def(HttpMethod::Get, "/one", "same")])
            .unwrap();
        let err = registry
            .bind(OwnerId::new("b"), vec![def(HttpMethod::Get, "/two", "same")])
            .unwrap_err();
        assert!(matches!(err, RouterError::DuplicateHandler { .. }));
        assert!(!registry.snapshot().is_bound(&OwnerId::new("b")));
    }

    #[test]
    fn test_rebind_replaces_owner_group() {
        let registry = RouteRegistry::new();
        let owner = OwnerId::new("a");
        registry
            .bind(
                owner.clone(),
                vec![
                    def(HttpMethod::Get, "/old", "index"),
                    def(HttpMethod::Delete, "/old/{id}", "delete"),
                ],
            )
            .unwrap();
        registry
            .bind(owner.clone(), vec![def(HttpMethod::Get, "/new", "index")])
            .unwrap();

        let table = registry.snapshot();
        assert_eq!(templates(&table, HttpMethod::Get), vec!["/new"]);
        assert!(table.routes_for(HttpMethod::Delete).is_empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_unbind_removes_only_owner_routes() {
        let registry = RouteRegistry::new();
        registry
            .bind(OwnerId::new("a"), vec![def(HttpMethod::Get, "/a/{p+}", "a")])
            .unwrap();
        registry
            .bind(OwnerId::new("b"), vec![def(HttpMethod::Get, "/b", "b")])
            .unwrap();

        assert_eq!(registry.unbind(&OwnerId::new("a")), 1);

        let table = registry.snapshot();
        assert_eq!(templates(&table, HttpMethod::Get), vec!["/b"]);
        assert_eq!(table.owners(), vec![OwnerId::new("b")]);
        assert!(table
            .route_for_handler(&HandlerRef::new("ctrl", "a"))
            .is_none());
    }

    #[test]
    fn test_unbind_is_idempotent() {
        let registry = RouteRegistry::new();
        assert_eq!(registry.unbind(&OwnerId::new("ghost")), 0);

        registry
            .bind(OwnerId::new("a"), vec![def(HttpMethod::Get, "/a", "a")])
            .unwrap();
        assert_eq!(registry.unbind(&OwnerId::new("a")), 1);
        let generation = registry.snapshot().generation();
        assert_eq!(registry.unbind(&OwnerId::new("a")), 0);
        assert_eq!(registry.snapshot().generation(), generation);
    }

    #[test]
    fn test_unbound_handler_can_be_rebound_elsewhere() {
        let registry = RouteRegistry::new();
        registry
            .bind(OwnerId::new("a"), vec![def(HttpMethod::Get, "/x", "x")])
            .unwrap();
        registry.unbind(&OwnerId::new("a"));
        registry
            .bind(OwnerId::new("b"), vec![def(HttpMethod::Get, "/y", "x")])
            .unwrap();
        let table = registry.snapshot();
        let route = table.route_for_handler(&HandlerRef::new("ctrl", "x")).unwrap();
        assert_eq!(route.template(), "/y");
    }

    #[test]
    fn test_snapshot_is_stable() {
        let registry = RouteRegistry::new();
        let before = registry.snapshot();
        registry
            .bind(OwnerId::new("a"), vec![def(HttpMethod::Get, "/a", "a")])
            .unwrap();
        assert!(before.is_empty());
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn test_routes_of_owner_in_declaration_order() {
        let registry = RouteRegistry::new();
        registry
            .bind(
                OwnerId::new("a"),
                vec![
                    def(HttpMethod::Get, "/z/{p+}", "z"),
                    def(HttpMethod::Get, "/a", "a"),
                ],
            )
            .unwrap();
        let table = registry.snapshot();
        let owned: Vec<String> = table
            .routes_of(&OwnerId::new("a"))
            .iter()
            .map(|r| r.template().to_string())
            .collect();
        assert_eq!(owned, vec!["/z/{p+}", "/a"]);
        assert!(table.routes_of(&OwnerId::new("nobody")).is_empty());
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let registry = RouteRegistry::new();
        registry
            .bind(
                OwnerId::new("a"),
                vec![def(HttpMethod::Get, "/1", "1"), def(HttpMethod::Get, "/2", "2")],
            )
            .unwrap();
        registry
            .bind(OwnerId::new("b"), vec![def(HttpMethod::Get, "/3", "3")])
            .unwrap();
        let table = registry.snapshot();
        let seqs: Vec<u64> = table
            .routes_for(HttpMethod::Get)
            .iter()
            .map(|r| r.sequence())
            .collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }
}
