//! Router settings.
//!
//! [`RouterSettings`] holds the few knobs the router has, with sensible
//! defaults. The router never reads files or the environment itself: the
//! hosting application loads settings with the functions in this module and
//! hands them to the router.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON document (overriding defaults, missing keys keep theirs).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `WAYPOST_REVERSE_POLICY` | `reverse_policy` (`append_query` or `strict`) |
//! | `WAYPOST_STRIP_QUERY` | `strip_query` |
//! | `WAYPOST_LOG_LEVEL` | `log_level` |
//! | `WAYPOST_DEBUG` | `debug` |

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RouterError, RouterResult};

/// What reverse resolution does with parameters no placeholder consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReversePolicy {
    /// Append them as a query string, in the order they were supplied.
    #[default]
    AppendQuery,
    /// Reject the call with [`RouterError::UnusedParameters`].
    Strict,
}

impl std::str::FromStr for ReversePolicy {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "append_query" | "query" => Ok(Self::AppendQuery),
            "strict" => Ok(Self::Strict),
            other => Err(RouterError::Configuration(format!(
                "unknown reverse policy '{other}'"
            ))),
        }
    }
}

/// The complete set of router settings.
///
/// # Examples
///
/// ```
/// use waypost_core::settings::{ReversePolicy, RouterSettings};
///
/// let settings = RouterSettings::default();
/// assert_eq!(settings.reverse_policy, ReversePolicy::AppendQuery);
/// assert!(settings.strip_query);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Policy for reverse-resolution parameters not used by the template.
    pub reverse_policy: ReversePolicy,
    /// Whether lookup ignores everything from the first `?` or `#` of the raw path.
    pub strip_query: bool,
    /// The tracing filter directive (e.g. `"info"`, `"waypost_router=trace"`).
    pub log_level: String,
    /// Whether to use human-readable log output instead of JSON.
    pub debug: bool,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            reverse_policy: ReversePolicy::AppendQuery,
            strip_query: true,
            log_level: "info".to_string(),
            debug: false,
        }
    }
}

/// Loads settings from a TOML string. Keys not present keep their defaults.
///
/// # Errors
///
/// Returns [`RouterError::Configuration`] if the TOML is malformed or has
/// values of the wrong type.
pub fn from_toml_str(toml_str: &str) -> RouterResult<RouterSettings> {
    toml::from_str(toml_str)
        .map_err(|e| RouterError::Configuration(format!("Failed to parse TOML: {e}")))
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> RouterResult<RouterSettings> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        RouterError::Configuration(format!(
            "Failed to read TOML file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_toml_str(&content)
}

/// Loads settings from a JSON string. Keys not present keep their defaults.
///
/// # Errors
///
/// Returns [`RouterError::Configuration`] if the JSON is malformed.
pub fn from_json_str(json_str: &str) -> RouterResult<RouterSettings> {
    serde_json::from_str(json_str)
        .map_err(|e| RouterError::Configuration(format!("Failed to parse JSON: {e}")))
}

/// Applies `WAYPOST_*` environment variable overrides to `settings`.
///
/// Unparseable values are ignored and the existing setting is kept.
pub fn apply_env_overrides(settings: &mut RouterSettings) {
    apply_overrides(settings, |key| std::env::var(key).ok());
}

/// Applies overrides from an arbitrary key lookup, using the same keys as
/// [`apply_env_overrides`].
pub fn apply_overrides<F>(settings: &mut RouterSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("WAYPOST_REVERSE_POLICY") {
        match val.parse() {
            Ok(policy) => settings.reverse_policy = policy,
            Err(e) => tracing::warn!(error = %e, "ignoring WAYPOST_REVERSE_POLICY"),
        }
    }

    if let Some(val) = lookup("WAYPOST_STRIP_QUERY") {
        settings.strip_query = parse_flag(&val);
    }

    if let Some(val) = lookup("WAYPOST_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Some(val) = lookup("WAYPOST_DEBUG") {
        settings.debug = parse_flag(&val);
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            reverse_policy = "strict"
            log_level = "debug"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.reverse_policy, ReversePolicy::Strict);
        assert_eq!(settings.log_level, "debug");
        // Defaults preserved
        assert!(settings.strip_query);
        assert!(!settings.debug);
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert_eq!(settings, RouterSettings::default());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        assert!(from_toml_str("reverse_policy = [").is_err());
        assert!(from_toml_str("reverse_policy = \"sometimes\"").is_err());
    }

    #[test]
    fn test_from_json_str_basic() {
        let settings = from_json_str(r#"{"strip_query": false, "debug": true}"#).unwrap();
        assert!(!settings.strip_query);
        assert!(settings.debug);
        assert_eq!(settings.reverse_policy, ReversePolicy::AppendQuery);
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file() {
        let dir = std::env::temp_dir().join("waypost_test_toml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("router.toml");
        std::fs::write(&path, "reverse_policy = \"strict\"\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert_eq!(settings.reverse_policy, ReversePolicy::Strict);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = from_toml_file("/nonexistent/path/router.toml").unwrap_err();
        assert!(matches!(err, RouterError::Configuration(_)));
    }

    // ── Overrides ───────────────────────────────────────────────────

    #[test]
    fn test_overrides_applied() {
        let mut settings = RouterSettings::default();
        apply_overrides(
            &mut settings,
            lookup_from(&[
                ("WAYPOST_REVERSE_POLICY", "STRICT"),
                ("WAYPOST_STRIP_QUERY", "0"),
                ("WAYPOST_LOG_LEVEL", "trace"),
                ("WAYPOST_DEBUG", "yes"),
            ]),
        );
        assert_eq!(settings.reverse_policy, ReversePolicy::Strict);
        assert!(!settings.strip_query);
        assert_eq!(settings.log_level, "trace");
        assert!(settings.debug);
    }

    #[test]
    fn test_invalid_policy_override_ignored() {
        let mut settings = RouterSettings::default();
        apply_overrides(
            &mut settings,
            lookup_from(&[("WAYPOST_REVERSE_POLICY", "lenient")]),
        );
        assert_eq!(settings.reverse_policy, ReversePolicy::AppendQuery);
    }

    #[test]
    fn test_reverse_policy_from_str() {
        assert_eq!("append-query".parse::<ReversePolicy>().unwrap(), ReversePolicy::AppendQuery);
        assert_eq!("Strict".parse::<ReversePolicy>().unwrap(), ReversePolicy::Strict);
        assert!("nope".parse::<ReversePolicy>().is_err());
    }
}
