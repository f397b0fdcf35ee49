//! The page result taxonomy.
//!
//! Every page function resolves to exactly one [`PageResult`] variant; the
//! dispatchers branch on it and nothing else. This is the single canonical
//! result vocabulary shared by the server and client execution environments.

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::seo::SeoDescriptor;

/// The page-specific payload of an `ok` result, consumed by the view layer
/// and serialized into the hydration payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteContext(serde_json::Value);

impl RouteContext {
    /// Wrap a JSON value as a route context.
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON value.
    #[must_use]
    pub const fn value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Take the underlying JSON value.
    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for RouteContext {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Redirect status codes permitted by the contract.
///
/// Guard-sourced redirects default to [`Found`](Self::Found) (302, temporary);
/// SEO-classified permanent moves default to
/// [`MovedPermanently`](Self::MovedPermanently) (301).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum RedirectStatus {
    /// 301: permanent move, the default for SEO-sourced redirects.
    MovedPermanently,
    /// 302: temporary, the default for navigational guards.
    Found,
    /// 307: temporary, method-preserving.
    TemporaryRedirect,
    /// 308: permanent, method-preserving.
    PermanentRedirect,
}

impl RedirectStatus {
    /// The numeric status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::MovedPermanently => 301,
            Self::Found => 302,
            Self::TemporaryRedirect => 307,
            Self::PermanentRedirect => 308,
        }
    }

    /// Whether this redirect is permanent (301 or 308).
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        matches!(self, Self::MovedPermanently | Self::PermanentRedirect)
    }

    /// As an [`http::StatusCode`].
    #[must_use]
    pub fn status(self) -> StatusCode {
        match self {
            Self::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
            Self::Found => StatusCode::FOUND,
            Self::TemporaryRedirect => StatusCode::TEMPORARY_REDIRECT,
            Self::PermanentRedirect => StatusCode::PERMANENT_REDIRECT,
        }
    }
}

impl From<RedirectStatus> for u16 {
    fn from(status: RedirectStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u16> for RedirectStatus {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            301 => Ok(Self::MovedPermanently),
            302 => Ok(Self::Found),
            307 => Ok(Self::TemporaryRedirect),
            308 => Ok(Self::PermanentRedirect),
            other => Err(format!("{other} is not a redirect status")),
        }
    }
}

/// Serializable discriminant of a [`PageResult`], used in the hydration
/// payload and the client view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultKind {
    /// Page produced renderable content.
    Ok,
    /// Page redirected elsewhere.
    Redirect,
    /// No document at this URL.
    NotFound,
    /// Page function (or context derivation) failed.
    Error,
    /// Access denied (403).
    Forbidden,
    /// Authentication required (401).
    Unauthorized,
    /// Document permanently removed (410).
    Gone,
    /// Blocked for legal reasons (451).
    UnavailableForLegalReasons,
}

/// The discriminated outcome of one page-function invocation.
///
/// Constructed through the associated functions below; consumed exactly once
/// by whichever dispatcher invoked the page function. The terminal variants
/// (`NotFound` and the extended taxonomy) carry an optional fallback context
/// so the view layer can render contextual content instead of a blank page.
#[derive(Debug)]
pub enum PageResult {
    /// Renderable content, optionally with an SEO descriptor and a status
    /// override.
    Ok {
        /// The page-specific payload.
        context: RouteContext,
        /// Result-level SEO descriptor; takes precedence over the route's
        /// SEO configuration.
        seo: Option<SeoDescriptor>,
        /// HTTP status override (defaults to 200).
        status: Option<StatusCode>,
    },
    /// Navigate elsewhere.
    Redirect {
        /// Target path or URL.
        to: String,
        /// Redirect status.
        status: RedirectStatus,
    },
    /// No document at this URL (404).
    NotFound {
        /// Optional payload for a contextual not-found view.
        fallback: Option<RouteContext>,
    },
    /// The page function failed.
    Error {
        /// The original failure, preserved for logging.
        error: anyhow::Error,
        /// HTTP status override (defaults to 500).
        status: Option<StatusCode>,
    },
    /// Access denied (403).
    Forbidden {
        /// Optional payload for a contextual view.
        fallback: Option<RouteContext>,
    },
    /// Authentication required (401).
    Unauthorized {
        /// Optional payload for a contextual view.
        fallback: Option<RouteContext>,
    },
    /// Document permanently removed (410).
    Gone {
        /// Optional payload for a contextual view.
        fallback: Option<RouteContext>,
    },
    /// Blocked for legal reasons (451).
    UnavailableForLegalReasons {
        /// Optional payload for a contextual view.
        fallback: Option<RouteContext>,
    },
}

impl PageResult {
    /// An `ok` result carrying the given route context.
    #[must_use]
    pub fn ok(context: impl Into<RouteContext>) -> Self {
        Self::Ok {
            context: context.into(),
            seo: None,
            status: None,
        }
    }

    /// A guard-sourced redirect (302 Found).
    #[must_use]
    pub fn redirect(to: impl Into<String>) -> Self {
        Self::Redirect {
            to: to.into(),
            status: RedirectStatus::Found,
        }
    }

    /// A permanent redirect (301 Moved Permanently).
    #[must_use]
    pub fn redirect_permanent(to: impl Into<String>) -> Self {
        Self::Redirect {
            to: to.into(),
            status: RedirectStatus::MovedPermanently,
        }
    }

    /// A redirect with an explicit status.
    #[must_use]
    pub fn redirect_with(to: impl Into<String>, status: RedirectStatus) -> Self {
        Self::Redirect {
            to: to.into(),
            status,
        }
    }

    /// A `not-found` result with no fallback context.
    #[must_use]
    pub const fn not_found() -> Self {
        Self::NotFound { fallback: None }
    }

    /// An `error` result carrying the original failure.
    #[must_use]
    pub fn error(error: impl Into<anyhow::Error>) -> Self {
        Self::Error {
            error: error.into(),
            status: None,
        }
    }

    /// A `forbidden` result (403).
    #[must_use]
    pub const fn forbidden() -> Self {
        Self::Forbidden { fallback: None }
    }

    /// An `unauthorized` result (401).
    #[must_use]
    pub const fn unauthorized() -> Self {
        Self::Unauthorized { fallback: None }
    }

    /// A `gone` result (410).
    #[must_use]
    pub const fn gone() -> Self {
        Self::Gone { fallback: None }
    }

    /// An `unavailable-for-legal-reasons` result (451).
    #[must_use]
    pub const fn unavailable_for_legal_reasons() -> Self {
        Self::UnavailableForLegalReasons { fallback: None }
    }

    /// Attach an SEO descriptor; only meaningful on the `Ok` variant, a
    /// no-op elsewhere.
    #[must_use]
    pub fn with_seo(mut self, descriptor: SeoDescriptor) -> Self {
        if let Self::Ok { seo, .. } = &mut self {
            *seo = Some(descriptor);
        }
        self
    }

    /// Override the HTTP status; meaningful on `Ok` and `Error`, a no-op
    /// elsewhere.
    #[must_use]
    pub fn with_status(mut self, code: StatusCode) -> Self {
        match &mut self {
            Self::Ok { status, .. } | Self::Error { status, .. } => *status = Some(code),
            _ => {},
        }
        self
    }

    /// Attach a fallback context to a terminal variant (`NotFound`,
    /// `Forbidden`, `Unauthorized`, `Gone`,
    /// `UnavailableForLegalReasons`); a no-op elsewhere.
    #[must_use]
    pub fn with_fallback(mut self, context: impl Into<RouteContext>) -> Self {
        match &mut self {
            Self::NotFound { fallback }
            | Self::Forbidden { fallback }
            | Self::Unauthorized { fallback }
            | Self::Gone { fallback }
            | Self::UnavailableForLegalReasons { fallback } => *fallback = Some(context.into()),
            _ => {},
        }
        self
    }

    /// The serializable discriminant of this result.
    #[must_use]
    pub const fn kind(&self) -> ResultKind {
        match self {
            Self::Ok { .. } => ResultKind::Ok,
            Self::Redirect { .. } => ResultKind::Redirect,
            Self::NotFound { .. } => ResultKind::NotFound,
            Self::Error { .. } => ResultKind::Error,
            Self::Forbidden { .. } => ResultKind::Forbidden,
            Self::Unauthorized { .. } => ResultKind::Unauthorized,
            Self::Gone { .. } => ResultKind::Gone,
            Self::UnavailableForLegalReasons { .. } => ResultKind::UnavailableForLegalReasons,
        }
    }

    /// The HTTP status this result maps to, honoring overrides.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Ok { status, .. } => status.unwrap_or(StatusCode::OK),
            Self::Redirect { status, .. } => status.status(),
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Error { status, .. } => status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Gone { .. } => StatusCode::GONE,
            Self::UnavailableForLegalReasons { .. } => {
                StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS
            },
        }
    }

    /// The fallback context of a terminal variant, when one was attached.
    #[must_use]
    pub const fn fallback(&self) -> Option<&RouteContext> {
        match self {
            Self::NotFound { fallback }
            | Self::Forbidden { fallback }
            | Self::Unauthorized { fallback }
            | Self::Gone { fallback }
            | Self::UnavailableForLegalReasons { fallback } => fallback.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_mapping() {
        assert_eq!(
            PageResult::ok(json!({})).status_code(),
            StatusCode::OK
        );
        assert_eq!(
            PageResult::redirect("/login").status_code(),
            StatusCode::FOUND
        );
        assert_eq!(
            PageResult::redirect_permanent("/new").status_code(),
            StatusCode::MOVED_PERMANENTLY
        );
        assert_eq!(
            PageResult::not_found().status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PageResult::error(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            PageResult::forbidden().status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            PageResult::unauthorized().status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(PageResult::gone().status_code(), StatusCode::GONE);
        assert_eq!(
            PageResult::unavailable_for_legal_reasons().status_code(),
            StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS
        );
    }

    #[test]
    fn status_override_applies_to_ok_and_error() {
        let accepted = PageResult::ok(json!({})).with_status(StatusCode::ACCEPTED);
        assert_eq!(accepted.status_code(), StatusCode::ACCEPTED);

        let bad_gateway =
            PageResult::error(anyhow::anyhow!("upstream")).with_status(StatusCode::BAD_GATEWAY);
        assert_eq!(bad_gateway.status_code(), StatusCode::BAD_GATEWAY);

        // No-op on other variants.
        let redirect = PageResult::redirect("/x").with_status(StatusCode::ACCEPTED);
        assert_eq!(redirect.status_code(), StatusCode::FOUND);
    }

    #[test]
    fn guard_redirect_defaults_to_302() {
        let result = PageResult::redirect("/login");
        match result {
            PageResult::Redirect { to, status } => {
                assert_eq!(to, "/login");
                assert_eq!(status, RedirectStatus::Found);
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn fallback_attaches_to_terminal_variants() {
        let result = PageResult::not_found().with_fallback(json!({"hint": "gone fishing"}));
        assert!(result.fallback().is_some());
        assert_eq!(result.kind(), ResultKind::NotFound);
    }

    #[test]
    fn result_kind_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ResultKind::NotFound).unwrap(),
            "\"not-found\""
        );
        assert_eq!(
            serde_json::to_string(&ResultKind::UnavailableForLegalReasons).unwrap(),
            "\"unavailable-for-legal-reasons\""
        );
    }

    #[test]
    fn redirect_status_round_trips_as_code() {
        let json = serde_json::to_string(&RedirectStatus::MovedPermanently).unwrap();
        assert_eq!(json, "301");
        let back: RedirectStatus = serde_json::from_str("308").unwrap();
        assert_eq!(back, RedirectStatus::PermanentRedirect);
        assert!(serde_json::from_str::<RedirectStatus>("200").is_err());
    }
}
