//! Dispatcher-boundary errors.
//!
//! A page function failing is *not* an `SsrError`: that is caught and
//! converted into an `error` page result with its own response. The errors
//! here are the ones the contract leaves to the hosting environment: a
//! render hook failing, or the composed document not serializing. The
//! dispatcher must not swallow these silently.

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

/// Failures escaping the dispatch boundary.
#[derive(Debug, Error)]
pub enum SsrError {
    /// A render hook raised while rendering a branch.
    #[error("render hook failed: {0}")]
    Render(#[source] anyhow::Error),

    /// The hydration payload could not be serialized.
    #[error("hydration payload serialization failed: {0}")]
    Hydration(#[from] serde_json::Error),
}

impl IntoResponse for SsrError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "SSR dispatch failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error {}", StatusCode::INTERNAL_SERVER_ERROR.as_u16()),
        )
            .into_response()
    }
}
