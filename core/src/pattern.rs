//! Route pattern parsing, matching and URL generation.
//!
//! Patterns are `/`-separated sequences of literal segments and named
//! parameter segments (`:name`, or `:name?` for an optional trailing
//! parameter). Parameter names are discovered by parsing the pattern string
//! once, at registry construction time; the parsed form is then used both for
//! matching inbound pathnames and for generating URLs from parameter maps.
//!
//! # Example
//!
//! ```
//! use pagecraft_core::pattern::RoutePattern;
//!
//! let pattern = RoutePattern::parse("/profile/:id").unwrap();
//! let params = pattern.matches("/profile/42").unwrap();
//! assert_eq!(params.get("id"), Some("42"));
//! assert_eq!(pattern.build_url(&params).unwrap(), "/profile/42");
//! ```

use std::fmt;

use thiserror::Error;

use crate::request::RouteParams;

/// Errors raised while parsing a pattern or generating a URL from one.
///
/// Parse-time variants are configuration errors and abort registry
/// construction; they are never absorbed at request time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A `:` segment with no name, e.g. `/users/:`.
    #[error("route pattern `{pattern}` has an empty parameter name")]
    EmptyParamName {
        /// The offending pattern.
        pattern: String,
    },

    /// The same parameter name appears twice in one pattern.
    #[error("route pattern `{pattern}` declares parameter `{name}` more than once")]
    DuplicateParam {
        /// The offending pattern.
        pattern: String,
        /// The repeated parameter name.
        name: String,
    },

    /// An optional parameter is followed by a required segment.
    ///
    /// Optional parameters are only meaningful as a trailing run: a path
    /// cannot omit a middle segment without shifting every later one.
    #[error("optional parameter `{name}` in pattern `{pattern}` must be trailing")]
    OptionalNotTrailing {
        /// The offending pattern.
        pattern: String,
        /// The optional parameter that is not in the trailing run.
        name: String,
    },

    /// `build_url` was called without a value for a required parameter.
    #[error("missing value for required parameter `{name}`")]
    MissingParam {
        /// The parameter with no (non-empty) value.
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param { name: String, optional: bool },
}

/// A parsed route pattern.
///
/// Construction validates the pattern; matching and URL generation then
/// operate on the parsed segment list without re-parsing.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
    required: usize,
}

impl RoutePattern {
    /// Parse a pattern string.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when the pattern has an empty parameter
    /// name, a duplicate parameter name, or an optional parameter outside the
    /// trailing run. These are fatal configuration errors.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut names: Vec<String> = Vec::new();
        let mut seen_optional = false;

        for part in pattern.split('/').filter(|s| !s.is_empty()) {
            if let Some(spec) = part.strip_prefix(':') {
                let (name, optional) = match spec.strip_suffix('?') {
                    Some(name) => (name, true),
                    None => (spec, false),
                };
                if name.is_empty() {
                    return Err(PatternError::EmptyParamName {
                        pattern: pattern.to_string(),
                    });
                }
                if names.iter().any(|n| n == name) {
                    return Err(PatternError::DuplicateParam {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
                if seen_optional && !optional {
                    return Err(PatternError::OptionalNotTrailing {
                        pattern: pattern.to_string(),
                        name: last_optional_name(&segments).unwrap_or_default(),
                    });
                }
                seen_optional |= optional;
                names.push(name.to_string());
                segments.push(Segment::Param {
                    name: name.to_string(),
                    optional,
                });
            } else {
                if seen_optional {
                    return Err(PatternError::OptionalNotTrailing {
                        pattern: pattern.to_string(),
                        name: last_optional_name(&segments).unwrap_or_default(),
                    });
                }
                segments.push(Segment::Literal(part.to_string()));
            }
        }

        let required = segments
            .iter()
            .filter(|s| !matches!(s, Segment::Param { optional: true, .. }))
            .count();

        Ok(Self {
            raw: pattern.to_string(),
            segments,
            required,
        })
    }

    /// The pattern string as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Names of all parameters declared by the pattern, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a pathname against this pattern.
    ///
    /// Returns the extracted parameters on a hit, `None` otherwise. Literal
    /// segments compare exactly (no normalization, no case folding);
    /// parameter segments are URL-decoded before binding. A pathname may omit
    /// any suffix of the trailing optional run; omitted parameters are absent
    /// from the result, never present with an empty value.
    #[must_use]
    pub fn matches(&self, pathname: &str) -> Option<RouteParams> {
        let path: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();
        if path.len() < self.required || path.len() > self.segments.len() {
            return None;
        }

        let mut params = RouteParams::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match (segment, path.get(i)) {
                (Segment::Literal(lit), Some(seg)) => {
                    if lit != seg {
                        return None;
                    }
                },
                (Segment::Param { name, .. }, Some(seg)) => {
                    params.insert(name.clone(), decode_segment(seg));
                },
                (Segment::Param { optional: true, .. }, None) => {},
                (_, None) => return None,
            }
        }
        Some(params)
    }

    /// Generate a URL from a parameter map.
    ///
    /// Parameter values are percent-encoded, but only where a path segment
    /// requires it: characters that are legal raw in a segment (RFC 3986
    /// `pchar`) pass through, so a matched pathname rebuilds byte-identical.
    /// Optional parameters may be absent (or empty), in which case the URL
    /// stops before them.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::MissingParam`] when a required parameter has
    /// no non-empty value, or when an optional parameter is present while an
    /// earlier one in the trailing run is absent (a path cannot skip a
    /// segment).
    pub fn build_url(&self, params: &RouteParams) -> Result<String, PatternError> {
        let mut parts: Vec<Option<String>> = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => parts.push(Some(lit.clone())),
                Segment::Param { name, optional } => {
                    match params.get(name).filter(|v| !v.is_empty()) {
                        Some(value) => parts.push(Some(encode_segment(value))),
                        None if *optional => parts.push(None),
                        None => {
                            return Err(PatternError::MissingParam { name: name.clone() });
                        },
                    }
                },
            }
        }

        // Trailing absences are dropped; a gap before a present segment is
        // unrepresentable as a path.
        while matches!(parts.last(), Some(None)) {
            parts.pop();
        }
        let mut url = String::new();
        for (part, segment) in parts.into_iter().zip(&self.segments) {
            match part {
                Some(p) => {
                    url.push('/');
                    url.push_str(&p);
                },
                None => {
                    let name = match segment {
                        Segment::Param { name, .. } => name.clone(),
                        Segment::Literal(lit) => lit.clone(),
                    };
                    return Err(PatternError::MissingParam { name });
                },
            }
        }
        if url.is_empty() {
            url.push('/');
        }
        Ok(url)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn last_optional_name(segments: &[Segment]) -> Option<String> {
    segments.iter().rev().find_map(|s| match s {
        Segment::Param {
            name,
            optional: true,
        } => Some(name.clone()),
        _ => None,
    })
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| segment.to_string())
}

/// Percent-encode a path segment, leaving RFC 3986 `pchar` bytes raw:
/// unreserved, sub-delims, `:` and `@`.
fn encode_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-' | b'.' | b'_' | b'~'
            | b'!' | b'$' | b'&' | b'\'' | b'(' | b')'
            | b'*' | b'+' | b',' | b';' | b'='
            | b':' | b'@' => out.push(char::from(byte)),
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            },
        }
    }
    out
}
