//! The inbound-request model at the transport boundary.
//!
//! The dispatcher never sees the transport's request type; the hosting
//! environment converts whatever it has into an [`InboundRequest`]. A
//! conversion from [`http::request::Parts`] is provided for axum hosts.

use std::collections::HashMap;

use http::Method;
use pagecraft_core::request::{
    cookies_from_header, query_pairs, RequestDescriptor, RequestLine, RouteParams,
};

/// An inbound request, already detached from the transport.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// Pathname (no query string).
    pub path: String,
    /// Raw query string, when present.
    pub query_string: Option<String>,
    /// HTTP method.
    pub method: Method,
    /// Header map with lowercase names.
    pub headers: HashMap<String, String>,
    /// Cookie map, parsed from the `Cookie` header.
    pub cookies: HashMap<String, String>,
}

impl InboundRequest {
    /// A `GET` request for the given path; a `?query` suffix is split off.
    #[must_use]
    pub fn get(path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (path, None),
        };
        Self {
            path: path.to_string(),
            query_string: query,
            method: Method::GET,
            headers: HashMap::new(),
            cookies: HashMap::new(),
        }
    }

    /// Build from [`http::request::Parts`].
    ///
    /// Header values that are not valid UTF-8 are skipped; cookies come from
    /// the `Cookie` header.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        let headers: HashMap<String, String> = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                Some((name.as_str().to_ascii_lowercase(), value.to_str().ok()?.to_string()))
            })
            .collect();
        let cookies = headers
            .get("cookie")
            .map(|v| cookies_from_header(v))
            .unwrap_or_default();
        Self {
            path: parts.uri.path().to_string(),
            query_string: parts.uri.query().map(str::to_string),
            method: parts.method.clone(),
            headers,
            cookies,
        }
    }

    /// Add a header (name is lowercased).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// The full URL as seen by the descriptor (path plus query string).
    #[must_use]
    pub fn url(&self) -> String {
        match &self.query_string {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// Project this request into the descriptor handed to page functions.
    #[must_use]
    pub fn descriptor(&self, params: RouteParams) -> RequestDescriptor {
        RequestDescriptor {
            params,
            query: self
                .query_string
                .as_deref()
                .map(query_pairs)
                .unwrap_or_default(),
            headers: self.headers.clone(),
            cookies: self.cookies.clone(),
            request: Some(RequestLine {
                url: self.url(),
                method: self.method.clone(),
            }),
        }
    }
}
