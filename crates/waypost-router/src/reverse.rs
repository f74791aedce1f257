//! Reverse URL resolution.
//!
//! Turns a handler reference and parameter values back into a concrete path
//! by walking the bound route's template. Values are percent-encoded so that
//! looking the generated path up again yields the same values.
//!
//! Parameters that no placeholder consumes are handled per
//! [`ReversePolicy`]: appended as a query string in the order supplied
//! (the default), or rejected.

use percent_encoding::utf8_percent_encode;
use url::form_urlencoded;

use waypost_core::{ReversePolicy, RouterError, RouterResult};

use crate::pattern::{Segment, UriPattern, SEGMENT};
use crate::registry::RouteTable;
use crate::route::HandlerRef;

impl RouteTable {
    /// Generates the URL of the route bound to `handler`.
    ///
    /// When a name is supplied more than once, the first value fills the
    /// placeholder and the rest count as unused.
    ///
    /// # Errors
    ///
    /// - [`RouterError::UnknownHandler`] if no route is bound to `handler`.
    /// - [`RouterError::MissingParameter`] if a placeholder has no value.
    /// - [`RouterError::InvalidParameter`] if a value is empty.
    /// - [`RouterError::UnusedParameters`] in strict mode, if values are left over.
    pub fn reverse_url<I, K, V>(
        &self,
        handler: &HandlerRef,
        params: I,
        policy: ReversePolicy,
    ) -> RouterResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let route = self
            .route_for_handler(handler)
            .ok_or_else(|| RouterError::UnknownHandler(handler.to_string()))?;
        let params: Vec<(K, V)> = params.into_iter().collect();
        substitute_pattern(route.pattern(), &params, policy)
    }
}

/// Substitutes parameter values into a compiled template.
///
/// # Errors
///
/// See [`RouteTable::reverse_url`].
pub fn substitute_pattern<K, V>(
    pattern: &UriPattern,
    params: &[(K, V)],
    policy: ReversePolicy,
) -> RouterResult<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut used = vec![false; params.len()];
    let mut url = String::new();

    for segment in pattern.segments() {
        url.push('/');
        match segment {
            Segment::Literal(text) => url.push_str(text),
            Segment::Param(name) => {
                let value = take(pattern, params, &mut used, name)?;
                url.extend(utf8_percent_encode(value, SEGMENT));
            }
            Segment::Rest(name) => {
                let value = take(pattern, params, &mut used, name)?;
                if value.chars().all(|c| c == '/') {
                    return Err(RouterError::InvalidParameter {
                        template: pattern.template().to_string(),
                        name: name.to_string(),
                        reason: "a rest value needs at least one non-empty segment".to_string(),
                    });
                }
                for (i, piece) in value.split('/').enumerate() {
                    if i > 0 {
                        url.push('/');
                    }
                    url.extend(utf8_percent_encode(piece, SEGMENT));
                }
            }
            Segment::Wildcard => {}
        }
    }

    let unused: Vec<(&str, &str)> = params
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .map(|((k, v), _)| (k.as_ref(), v.as_ref()))
        .collect();

    if unused.is_empty() {
        return Ok(url);
    }

    match policy {
        ReversePolicy::Strict => Err(RouterError::UnusedParameters {
            template: pattern.template().to_string(),
            names: unused.iter().map(|(k, _)| (*k).to_string()).collect(),
        }),
        ReversePolicy::AppendQuery => {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(unused)
                .finish();
            url.push('?');
            url.push_str(&query);
            Ok(url)
        }
    }
}

/// Returns the first value supplied for `name` and marks it used.
fn take<'a, K, V>(
    pattern: &UriPattern,
    params: &'a [(K, V)],
    used: &mut [bool],
    name: &str,
) -> RouterResult<&'a str>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let index = params
        .iter()
        .position(|(k, _)| k.as_ref() == name)
        .ok_or_else(|| RouterError::MissingParameter {
            template: pattern.template().to_string(),
            name: name.to_string(),
        })?;
    used[index] = true;

    let value = params[index].1.as_ref();
    if value.is_empty() {
        return Err(RouterError::InvalidParameter {
            template: pattern.template().to_string(),
            name: name.to_string(),
            reason: "an empty value cannot fill a path segment".to_string(),
        });
    }
    Ok(value)
}
