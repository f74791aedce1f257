//! Routes and the values used to declare them.
//!
//! A hosting application describes a controller's routes as plain
//! [`RouteDefinition`]s, usually with [`RouteBuilder`]:
//!
//! ```
//! use waypost_router::{HandlerRef, HttpMethod, RouteBuilder};
//!
//! let def = RouteBuilder::new()
//!     .route(HttpMethod::Delete)
//!     .on("/todo/tasks/{id}")
//!     .to(HandlerRef::new("todo", "delete"));
//! assert_eq!(def.template, "/todo/tasks/{id}");
//! ```
//!
//! The registry compiles definitions into immutable [`Route`]s when they are bound.

use std::fmt;

use waypost_core::{CompileError, HttpMethod};

use crate::pattern::{normalize_path, PathParams, Priority, UriPattern};

/// Identifies the bound handler: a controller and one of its actions.
///
/// The router never inspects or invokes a handler; it only hands the
/// reference back to the caller and uses it as the key for reverse routing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerRef {
    controller: String,
    action: String,
}

impl HandlerRef {
    /// Creates a handler reference.
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }

    /// Returns the controller name.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// Returns the action name.
    pub fn action(&self) -> &str {
        &self.action
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.controller, self.action)
    }
}

/// Identifies the component that bound a group of routes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(String);

impl OwnerId {
    /// Creates an owner id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&OwnerId> for OwnerId {
    fn from(id: &OwnerId) -> Self {
        id.clone()
    }
}

/// An uncompiled route declaration: `(method, template, handler)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    /// The method the route answers to.
    pub method: HttpMethod,
    /// The URI template, e.g. `/foo/{id}`.
    pub template: String,
    /// The handler the route is bound to.
    pub handler: HandlerRef,
}

impl RouteDefinition {
    /// Creates a route definition.
    pub fn new(method: HttpMethod, template: impl Into<String>, handler: HandlerRef) -> Self {
        Self {
            method,
            template: template.into(),
            handler,
        }
    }
}

/// Fluent builder for [`RouteDefinition`]s.
///
/// The method defaults to `GET` and the template to `/`.
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    method: HttpMethod,
    template: String,
}

impl Default for RouteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteBuilder {
    /// Creates a builder for `GET /`.
    pub fn new() -> Self {
        Self {
            method: HttpMethod::Get,
            template: "/".to_string(),
        }
    }

    /// Sets the method.
    #[must_use]
    pub fn route(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the URI template.
    #[must_use]
    pub fn on(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Finishes the definition by naming its handler.
    pub fn to(self, handler: HandlerRef) -> RouteDefinition {
        RouteDefinition {
            method: self.method,
            template: self.template,
            handler,
        }
    }
}

/// An immutable binding of a method, a compiled template, and a handler.
#[derive(Debug, Clone)]
pub struct Route {
    method: HttpMethod,
    pattern: UriPattern,
    handler: HandlerRef,
    owner: OwnerId,
    /// Registration sequence number, the final tie-break in dispatch order
    seq: u64,
}

impl Route {
    /// Compiles a definition into a route owned by `owner`. The sequence
    /// number is assigned by the registry when the route is published.
    pub(crate) fn compile(definition: RouteDefinition, owner: OwnerId) -> Result<Self, CompileError> {
        let pattern = UriPattern::compile(&definition.template)?;
        Ok(Self {
            method: definition.method,
            pattern,
            handler: definition.handler,
            owner,
            seq: 0,
        })
    }

    pub(crate) fn sequenced(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    /// Returns the method.
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the original URI template.
    pub fn template(&self) -> &str {
        self.pattern.template()
    }

    /// Returns the compiled pattern.
    pub const fn pattern(&self) -> &UriPattern {
        &self.pattern
    }

    /// Returns the bound handler.
    pub const fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Returns the owner that bound this route.
    pub const fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Returns the dispatch priority derived from the template.
    pub const fn priority(&self) -> Priority {
        self.pattern.priority()
    }

    /// Returns the registration sequence number.
    pub const fn sequence(&self) -> u64 {
        self.seq
    }

    /// The total dispatch order key: priority, then registration order.
    pub(crate) fn order_key(&self) -> (Priority, u64) {
        (self.pattern.priority(), self.seq)
    }

    /// Tests a raw path against this route's template, ignoring the method.
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(&normalize_path(path))
    }

    /// Extracts the decoded path parameters of `path`, or `None` if the path
    /// does not match this route's template.
    pub fn path_parameters(&self, path: &str) -> Option<PathParams> {
        self.pattern.captures(&normalize_path(path))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.method, self.template(), self.handler)
    }
}
