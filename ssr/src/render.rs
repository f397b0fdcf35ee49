//! The render hook: the view layer's seam into the dispatcher.
//!
//! The rendering component is an external collaborator; the dispatcher's
//! responsibility stops at composing the full document around whatever
//! fragment the hook returns. When no hook is supplied, built-in minimal
//! fallbacks guarantee that not-found and error branches still produce
//! visible content, never a blank page.

use async_trait::async_trait;
use http::StatusCode;
use pagecraft_core::request::RequestDescriptor;
use pagecraft_core::result::RouteContext;
use pagecraft_core::seo::SeoDescriptor;

/// Renders page fragments for the dispatcher's branches.
///
/// `render_page` is the only required method; the status branches fall back
/// to minimal textual bodies unless overridden.
#[async_trait]
pub trait RenderHook: Send + Sync {
    /// Render the `ok` branch: the fragment placed inside the document's
    /// render target.
    ///
    /// # Errors
    ///
    /// A failure here escapes the dispatcher as
    /// [`SsrError::Render`](crate::error::SsrError::Render); it is never
    /// swallowed.
    async fn render_page(
        &self,
        context: &RouteContext,
        seo: Option<&SeoDescriptor>,
        request: &RequestDescriptor,
    ) -> Result<String, anyhow::Error>;

    /// Render the not-found branch, with the optional fallback context.
    ///
    /// # Errors
    ///
    /// Same propagation as [`render_page`](Self::render_page).
    async fn render_not_found(
        &self,
        fallback: Option<&RouteContext>,
    ) -> Result<String, anyhow::Error> {
        let _ = fallback;
        Ok(default_not_found())
    }

    /// Render a terminal status branch (error, forbidden, unauthorized,
    /// gone, unavailable-for-legal-reasons).
    ///
    /// # Errors
    ///
    /// Same propagation as [`render_page`](Self::render_page).
    async fn render_status(
        &self,
        status: StatusCode,
        fallback: Option<&RouteContext>,
    ) -> Result<String, anyhow::Error> {
        let _ = fallback;
        Ok(default_status(status))
    }
}

pub(crate) fn default_not_found() -> String {
    "Not Found".to_string()
}

pub(crate) fn default_status(status: StatusCode) -> String {
    format!("Error {}", status.as_u16())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct FragmentOnly;

    #[async_trait]
    impl RenderHook for FragmentOnly {
        async fn render_page(
            &self,
            context: &RouteContext,
            _seo: Option<&SeoDescriptor>,
            _request: &RequestDescriptor,
        ) -> Result<String, anyhow::Error> {
            Ok(format!("<main>{}</main>", context.value()))
        }
    }

    #[tokio::test]
    async fn default_branches_produce_visible_content() {
        let hook = FragmentOnly;
        assert_eq!(hook.render_not_found(None).await.unwrap(), "Not Found");
        assert_eq!(
            hook.render_status(StatusCode::INTERNAL_SERVER_ERROR, None)
                .await
                .unwrap(),
            "Error 500"
        );
    }
}
