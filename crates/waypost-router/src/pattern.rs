//! URI template parsing and matching.
//!
//! A template is a `/`-separated list of segments:
//!
//! | Segment   | Matches                                   | Captured |
//! |-----------|-------------------------------------------|----------|
//! | `foo`     | exactly `foo` (case-sensitive)            | no       |
//! | `{name}`  | one non-empty segment                     | yes      |
//! | `{name+}` | one or more trailing segments (last only) | yes      |
//! | `*`       | anything after the prefix (last only)     | no       |
//!
//! Templates compile to an anchored [`Regex`] over the *canonical* form of a
//! path: every segment is percent-decoded once and re-encoded with
//! [`SEGMENT`]. Literals are canonicalized the same way, so `/caf%C3%A9`
//! and `/café` are the same path, while an encoded `%2F` stays inside its
//! segment. Captured values are decoded exactly once when extracted.

use std::cmp::{Ordering, Reverse};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};

use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, CONTROLS};
use regex::Regex;

use waypost_core::{CompileError, CompileErrorKind};

/// Parameters extracted from a matched path, keyed by placeholder name.
pub type PathParams = HashMap<String, String>;

/// Bytes percent-encoded inside a single path segment.
pub const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// One parsed template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A literal segment, stored in canonical encoded form.
    Literal(String),
    /// `{name}`
    Param(String),
    /// `{name+}`
    Rest(String),
    /// A trailing bare `*`.
    Wildcard,
}

/// How general a template is. Earlier variants are more specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Specificity {
    /// Only literal segments.
    Literal,
    /// At least one `{name}`, no trailing catch-all.
    Parameterized,
    /// Ends in `{name+}` or `*`.
    CatchAll,
}

/// The dispatch priority of a compiled template.
///
/// Ordering is ascending: a smaller `Priority` is tried first. Catch-all
/// templates are further ordered by the length of their literal prefix,
/// longest first. Equal priorities are broken by registration order in the
/// registry.
///
/// Equality follows the ordering: two priorities are equal when neither is
/// tried before the other.
#[derive(Debug, Clone, Copy)]
pub struct Priority {
    specificity: Specificity,
    literal_prefix_len: usize,
}

impl Priority {
    /// Returns the specificity class.
    pub const fn specificity(self) -> Specificity {
        self.specificity
    }

    /// Returns the length of the canonical template text before the first placeholder.
    pub const fn literal_prefix_len(self) -> usize {
        self.literal_prefix_len
    }

    fn key(self) -> (Specificity, Reverse<usize>) {
        match self.specificity {
            Specificity::CatchAll => (self.specificity, Reverse(self.literal_prefix_len)),
            _ => (self.specificity, Reverse(0)),
        }
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Priority {}

impl Hash for Priority {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A compiled URI template.
///
/// Compilation is a pure function of the template string: compiling the same
/// template twice yields identical matching behavior.
#[derive(Clone)]
pub struct UriPattern {
    /// The original template (e.g. `"/foo/{id}"`)
    template: String,
    /// Parsed segments, in order
    segments: Vec<Segment>,
    /// The anchored regex over canonical paths
    regex: Regex,
    /// Placeholder names in capture-group order
    param_names: Vec<String>,
    priority: Priority,
}

impl fmt::Debug for UriPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UriPattern")
            .field("template", &self.template)
            .field("regex", &self.regex.as_str())
            .field("param_names", &self.param_names)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

impl PartialEq for UriPattern {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
    }
}

impl Eq for UriPattern {}

impl UriPattern {
    /// Compiles a URI template.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] if the template does not start with `/`,
    /// defines a parameter twice, uses `{name+}` or `*` anywhere but the
    /// last segment, or contains misplaced braces.
    ///
    /// # Examples
    ///
    /// ```
    /// use waypost_router::pattern::{normalize_path, UriPattern};
    ///
    /// let p = UriPattern::compile("/foo/{id}/{email}").unwrap();
    /// let params = p.captures(&normalize_path("/foo/1234/foo@aol.com")).unwrap();
    /// assert_eq!(params["id"], "1234");
    /// assert_eq!(params["email"], "foo@aol.com");
    /// ```
    pub fn compile(template: &str) -> Result<Self, CompileError> {
        let fail = |kind| CompileError::new(template, kind);

        let body = template
            .strip_prefix('/')
            .ok_or_else(|| fail(CompileErrorKind::MissingLeadingSlash))?;

        let raw_segments: Vec<&str> = body.split('/').collect();
        let last = raw_segments.len() - 1;

        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut seen = HashSet::new();
        for (i, raw) in raw_segments.iter().enumerate() {
            let segment = parse_segment(raw, i == last).map_err(fail)?;
            if let Segment::Param(name) | Segment::Rest(name) = &segment {
                if !seen.insert(name.clone()) {
                    return Err(fail(CompileErrorKind::DuplicateParameter(name.clone())));
                }
            }
            segments.push(segment);
        }

        let (regex_str, param_names) = build_regex(&segments);
        let regex = Regex::new(&regex_str)
            .map_err(|e| fail(CompileErrorKind::InvalidPattern(e.to_string())))?;

        Ok(Self {
            template: template.to_string(),
            priority: priority_of(&segments),
            segments,
            regex,
            param_names,
        })
    }

    /// Returns the original template string.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the parsed segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the compiled regex.
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns the placeholder names, in template order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns the dispatch priority.
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Tests a canonical path (see [`normalize_path`]).
    pub fn is_match(&self, canonical_path: &str) -> bool {
        self.regex.is_match(canonical_path)
    }

    /// Matches a canonical path and returns the decoded parameters, or `None`
    /// if the path does not match.
    pub fn captures(&self, canonical_path: &str) -> Option<PathParams> {
        let captures = self.regex.captures(canonical_path)?;
        let mut params = PathParams::with_capacity(self.param_names.len());
        for (i, name) in self.param_names.iter().enumerate() {
            let m = captures.get(i + 1)?;
            params.insert(name.clone(), decode(m.as_str()));
        }
        Some(params)
    }
}

/// Converts a raw request path into the canonical form patterns match against.
///
/// A missing leading `/` is added and an empty path becomes `/`. Every
/// segment is decoded once and re-encoded with [`SEGMENT`].
pub fn normalize_path(raw: &str) -> String {
    let body = raw.strip_prefix('/').unwrap_or(raw);
    let mut out = String::with_capacity(body.len() + 1);
    for segment in body.split('/') {
        out.push('/');
        out.push_str(&canonical_segment(segment));
    }
    out
}

/// Decodes a segment once and re-encodes it with [`SEGMENT`].
pub fn canonical_segment(segment: &str) -> String {
    let bytes: Vec<u8> = percent_decode_str(segment).collect();
    percent_encode(&bytes, SEGMENT).to_string()
}

fn decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

fn parse_segment(raw: &str, is_last: bool) -> Result<Segment, CompileErrorKind> {
    if raw == "*" {
        return if is_last {
            Ok(Segment::Wildcard)
        } else {
            Err(CompileErrorKind::WildcardNotTrailing)
        };
    }

    if let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        let (name, rest) = inner
            .strip_suffix('+')
            .map_or((inner, false), |name| (name, true));
        validate_name(name)?;
        return match (rest, is_last) {
            (false, _) => Ok(Segment::Param(name.to_string())),
            (true, true) => Ok(Segment::Rest(name.to_string())),
            (true, false) => Err(CompileErrorKind::RestNotTrailing(name.to_string())),
        };
    }

    if raw.contains(|c| c == '{' || c == '}') {
        return Err(CompileErrorKind::UnbalancedBraces);
    }
    Ok(Segment::Literal(canonical_segment(raw)))
}

fn validate_name(name: &str) -> Result<(), CompileErrorKind> {
    if name.contains(|c| c == '{' || c == '}') {
        return Err(CompileErrorKind::UnbalancedBraces);
    }
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(CompileErrorKind::InvalidParameterName(name.to_string()))
    }
}

fn build_regex(segments: &[Segment]) -> (String, Vec<String>) {
    let mut regex_str = String::from("^");
    let mut names = Vec::new();
    for segment in segments {
        regex_str.push('/');
        match segment {
            Segment::Literal(text) => regex_str.push_str(&regex::escape(text)),
            Segment::Param(name) => {
                regex_str.push_str("([^/]+)");
                names.push(name.clone());
            }
            Segment::Rest(name) => {
                // at least one non-empty segment
                regex_str.push_str("(.*[^/].*)");
                names.push(name.clone());
            }
            Segment::Wildcard => regex_str.push_str("(?:.*)"),
        }
    }
    regex_str.push('$');
    (regex_str, names)
}

fn priority_of(segments: &[Segment]) -> Priority {
    let specificity = match segments.last() {
        Some(Segment::Rest(_) | Segment::Wildcard) => Specificity::CatchAll,
        _ if segments.iter().any(|s| matches!(s, Segment::Param(_))) => {
            Specificity::Parameterized
        }
        _ => Specificity::Literal,
    };

    let mut prefix = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                write!(prefix, "/{text}").ok();
            }
            _ => break,
        }
    }

    Priority {
        specificity,
        literal_prefix_len: prefix.len(),
    }
}
