//! Request-scoped data surfaces: route parameters and the request descriptor.
//!
//! The [`RequestDescriptor`] is the *sole* data surface page functions and
//! root-context providers may depend on. Dispatchers populate it from
//! whatever their environment offers; fields with no client-side equivalent
//! (headers, cookies) default to empty maps so the same page function runs
//! unchanged in both environments.

use std::collections::{BTreeMap, HashMap};

use http::Method;
use serde::{Deserialize, Serialize};

/// Parameters extracted from a pathname by a route pattern.
///
/// Keys are the named segments of the pattern; values are the URL-decoded
/// pathname segments. Absent optional parameters have no entry (they are
/// never present with an empty string).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    /// Create an empty parameter map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Insert a parameter value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Whether a parameter is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// The request line of the inbound request, when one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// Full request URL (or the pathname for client-side navigation).
    pub url: String,
    /// HTTP method; client-side navigation reports `GET`.
    pub method: Method,
}

impl RequestLine {
    /// A `GET` request line for the given URL.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
        }
    }
}

/// Everything a page function or root-context provider may read about the
/// inbound request or navigation.
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    /// Parameters extracted from the matched route pattern.
    pub params: RouteParams,
    /// Decoded query-string pairs.
    pub query: HashMap<String, String>,
    /// Header map with lowercase names; empty client-side.
    pub headers: HashMap<String, String>,
    /// Cookie map; empty client-side.
    pub cookies: HashMap<String, String>,
    /// Request line, when the environment has one.
    pub request: Option<RequestLine>,
}

impl RequestDescriptor {
    /// An empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A descriptor carrying only a `GET` request line, as produced for
    /// client-side navigation.
    #[must_use]
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            request: Some(RequestLine::get(path)),
            ..Self::default()
        }
    }

    /// Replace the extracted route parameters.
    #[must_use]
    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    /// Look up a header by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Look up a cookie by name.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

/// Parse a `Cookie` header value into a name → value map.
///
/// Malformed pairs (no `=`) are skipped.
#[must_use]
pub fn cookies_from_header(value: &str) -> HashMap<String, String> {
    value
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Decode a query string into a key → value map.
///
/// `+` is treated as a space; later duplicates of a key win. A key with no
/// `=` maps to the empty string.
#[must_use]
pub fn query_pairs(query_string: &str) -> HashMap<String, String> {
    query_string
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or(spaced)
}
