//! The page function contract.
//!
//! A page function is invocable in both the request/response execution model
//! (SSR) and the in-browser navigation model (SPA). It never touches a
//! transport object; everything it may read arrives through
//! [`PageInput`]. Asynchronous work (data fetching) before returning is fine.
//!
//! Failure handling is the dispatcher's job: a page function reports failure
//! through the `Err` arm of [`PageOutcome`], and the calling dispatcher
//! converts that into an `error` result with status 500. Page functions are
//! never responsible for catching their own failures into the `error` tag.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::request::{RequestDescriptor, RouteParams};
use crate::result::PageResult;

/// What a page function resolves to: a tagged result, or a failure the
/// dispatcher will synthesize into an `error` result.
pub type PageOutcome = Result<PageResult, anyhow::Error>;

/// Input handed to a page function by the calling dispatcher.
pub struct PageInput<C> {
    /// Parameters extracted from the matched route pattern.
    pub params: RouteParams,
    /// The derived root context, when a provider is configured.
    pub root: Option<Arc<C>>,
    /// The request descriptor for this request/navigation.
    pub request: RequestDescriptor,
}

impl<C> PageInput<C> {
    /// Build an input with no root context.
    #[must_use]
    pub fn new(params: RouteParams, request: RequestDescriptor) -> Self {
        Self {
            params,
            root: None,
            request,
        }
    }

    /// Attach a root context.
    #[must_use]
    pub fn with_root(mut self, root: Arc<C>) -> Self {
        self.root = Some(root);
        self
    }
}

impl<C> Clone for PageInput<C> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            root: self.root.clone(),
            request: self.request.clone(),
        }
    }
}

impl<C> std::fmt::Debug for PageInput<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageInput")
            .field("params", &self.params)
            .field("root", &self.root.as_ref().map(|_| "<root context>"))
            .field("request", &self.request)
            .finish()
    }
}

/// The unit of business logic per route.
///
/// Implemented automatically for `async fn`s and async closures taking a
/// [`PageInput`], so most routes are plain functions:
///
/// ```
/// use pagecraft_core::page::{PageInput, PageOutcome};
/// use pagecraft_core::result::PageResult;
/// use serde_json::json;
///
/// async fn home(_input: PageInput<()>) -> PageOutcome {
///     Ok(PageResult::ok(json!({ "message": "Hi" })))
/// }
/// ```
#[async_trait]
pub trait PageFunction<C: Send + Sync + 'static>: Send + Sync {
    /// Produce the page result for this input.
    async fn run(&self, input: PageInput<C>) -> PageOutcome;
}

#[async_trait]
impl<C, F, Fut> PageFunction<C> for F
where
    C: Send + Sync + 'static,
    F: Fn(PageInput<C>) -> Fut + Send + Sync,
    Fut: Future<Output = PageOutcome> + Send,
{
    async fn run(&self, input: PageInput<C>) -> PageOutcome {
        (self)(input).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn greeter(input: PageInput<String>) -> PageOutcome {
        let who = input.root.as_deref().cloned().unwrap_or_default();
        Ok(PageResult::ok(json!({ "greeting": who })))
    }

    #[tokio::test]
    async fn plain_async_fns_are_page_functions() {
        let page: &dyn PageFunction<String> = &greeter;
        let input = PageInput::new(RouteParams::new(), RequestDescriptor::new())
            .with_root(Arc::new("hello".to_string()));
        let result = page.run(input).await.unwrap();
        assert!(matches!(result, PageResult::Ok { .. }));
    }

    #[tokio::test]
    async fn failures_travel_through_the_err_arm() {
        let failing =
            |_input: PageInput<()>| async { Err::<PageResult, _>(anyhow::anyhow!("upstream down")) };
        let outcome = failing.run(PageInput::new(RouteParams::new(), RequestDescriptor::new()))
            .await;
        assert!(outcome.is_err());
    }
}
