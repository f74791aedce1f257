//! Core error types for the waypost router.
//!
//! [`RouterError`] covers every failure the router reports to its callers:
//! template compilation failures raised by `bind`, conflicting handler
//! bindings, and the recoverable failures of reverse resolution. A lookup
//! that finds no route is *not* an error and never produces one of these.

use std::fmt;

use thiserror::Error;

/// The specific reason a URI template failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// The template does not start with `/`.
    MissingLeadingSlash,
    /// The same parameter name appears more than once.
    DuplicateParameter(String),
    /// A bare `*` appears somewhere other than the final segment.
    WildcardNotTrailing,
    /// A `{name+}` placeholder appears somewhere other than the final segment.
    RestNotTrailing(String),
    /// A `{` or `}` that is not part of a whole-segment placeholder.
    UnbalancedBraces,
    /// A placeholder name that is empty or contains unsupported characters.
    InvalidParameterName(String),
    /// The generated matcher could not be built.
    InvalidPattern(String),
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLeadingSlash => write!(f, "template must start with '/'"),
            Self::DuplicateParameter(name) => write!(f, "parameter '{name}' is defined twice"),
            Self::WildcardNotTrailing => write!(f, "'*' is only allowed as the last segment"),
            Self::RestNotTrailing(name) => {
                write!(f, "'{{{name}+}}' is only allowed as the last segment")
            }
            Self::UnbalancedBraces => write!(f, "unbalanced or misplaced braces"),
            Self::InvalidParameterName(name) => write!(f, "invalid parameter name '{name}'"),
            Self::InvalidPattern(reason) => write!(f, "invalid pattern: {reason}"),
        }
    }
}

/// A URI template that could not be compiled, with the offending template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot compile template '{template}': {kind}")]
pub struct CompileError {
    /// The template as it was supplied.
    pub template: String,
    /// What was wrong with it.
    pub kind: CompileErrorKind,
}

impl CompileError {
    /// Creates a new compile error for `template`.
    pub fn new(template: impl Into<String>, kind: CompileErrorKind) -> Self {
        Self {
            template: template.into(),
            kind,
        }
    }
}

/// The primary error type for the waypost router.
#[derive(Error, Debug)]
pub enum RouterError {
    // ── Registration ─────────────────────────────────────────────────

    /// A template in a bind batch is malformed. The registry is unchanged.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A handler reference is already bound to another route.
    #[error("handler '{handler}' is already bound (template '{template}')")]
    DuplicateHandler {
        /// The handler reference, rendered as `controller#action`.
        handler: String,
        /// The template of the route being rejected.
        template: String,
    },

    // ── Reverse resolution ───────────────────────────────────────────

    /// No route is currently bound to the handler reference.
    #[error("no route is bound to handler '{0}'")]
    UnknownHandler(String),

    /// The template requires a parameter the caller did not supply.
    #[error("missing value for parameter '{name}' of template '{template}'")]
    MissingParameter {
        /// The route template.
        template: String,
        /// The placeholder that has no value.
        name: String,
    },

    /// A supplied value cannot be substituted into its placeholder.
    #[error("invalid value for parameter '{name}' of template '{template}': {reason}")]
    InvalidParameter {
        /// The route template.
        template: String,
        /// The placeholder name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Parameters not used by the template were supplied in strict mode.
    #[error("parameters {names:?} are not used by template '{template}'")]
    UnusedParameters {
        /// The route template.
        template: String,
        /// The unused parameter names, in the order supplied.
        names: Vec<String>,
    },

    // ── Parsing and configuration ────────────────────────────────────

    /// A string does not name a known HTTP method.
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// A configuration value is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl RouterError {
    /// Returns `true` for failures a caller can recover from at runtime.
    ///
    /// Reverse-resolution failures are recoverable: the handler may simply
    /// have been unbound concurrently, or the caller passed the wrong values.
    /// Everything else indicates a registration or configuration mistake.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownHandler(_)
                | Self::MissingParameter { .. }
                | Self::InvalidParameter { .. }
                | Self::UnusedParameters { .. }
        )
    }
}

/// A convenience type alias for `Result<T, RouterError>`.
pub type RouterResult<T> = Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_display() {
        let err = CompileError::new(
            "/foo/{id}/{id}",
            CompileErrorKind::DuplicateParameter("id".into()),
        );
        assert_eq!(
            err.to_string(),
            "cannot compile template '/foo/{id}/{id}': parameter 'id' is defined twice"
        );
    }

    #[test]
    fn test_rest_not_trailing_display() {
        let kind = CompileErrorKind::RestNotTrailing("path".into());
        assert_eq!(kind.to_string(), "'{path+}' is only allowed as the last segment");
    }

    #[test]
    fn test_compile_error_converts_into_router_error() {
        let err: RouterError =
            CompileError::new("foo", CompileErrorKind::MissingLeadingSlash).into();
        assert!(matches!(err, RouterError::Compile(_)));
        assert!(err.to_string().contains("must start with '/'"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_missing_parameter_display() {
        let err = RouterError::MissingParameter {
            template: "/foo/{id}".into(),
            name: "id".into(),
        };
        assert_eq!(
            err.to_string(),
            "missing value for parameter 'id' of template '/foo/{id}'"
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(RouterError::UnknownHandler("c#a".into()).is_recoverable());
        assert!(RouterError::MissingParameter {
            template: "/x".into(),
            name: "y".into()
        }
        .is_recoverable());
        assert!(RouterError::UnusedParameters {
            template: "/x".into(),
            names: vec!["q".into()]
        }
        .is_recoverable());
        assert!(!RouterError::DuplicateHandler {
            handler: "c#a".into(),
            template: "/x".into()
        }
        .is_recoverable());
        assert!(!RouterError::Configuration("bad".into()).is_recoverable());
        assert!(!RouterError::UnknownMethod("FETCH".into()).is_recoverable());
    }
}
