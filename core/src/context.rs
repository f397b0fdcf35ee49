//! Root-context derivation.
//!
//! The root context (locale, session, request id, ...) is an opaque value
//! owned entirely by the consuming application. The core only demands a
//! producer: something that derives it from the request descriptor, once per
//! request or navigation. Derivation failure surfaces as an `error` result
//! with status 500; it never silently substitutes a default context.

use std::future::Future;

use async_trait::async_trait;

use crate::request::RequestDescriptor;

/// Derives the application-wide root context from an inbound request.
///
/// Must be callable in both execution environments; if the client-side
/// variant sees fewer inputs (no headers, no cookies), that is the
/// application's concern, not the dispatcher's.
#[async_trait]
pub trait RootContextProvider<C: Send + Sync + 'static>: Send + Sync {
    /// Derive the root context for this request.
    ///
    /// # Errors
    ///
    /// Any failure here is surfaced by the dispatcher as an `error` result
    /// with status 500.
    async fn derive(&self, request: &RequestDescriptor) -> Result<C, anyhow::Error>;
}

/// A provider built from a closure.
///
/// ```
/// use pagecraft_core::context::ProviderFn;
/// use pagecraft_core::request::RequestDescriptor;
///
/// let provider = ProviderFn::new(|request: RequestDescriptor| async move {
///     let locale = request
///         .header("accept-language")
///         .unwrap_or("en")
///         .to_string();
///     Ok::<_, anyhow::Error>(locale)
/// });
/// # let _ = provider;
/// ```
pub struct ProviderFn<F>(F);

impl<F> ProviderFn<F> {
    /// Wrap a closure as a provider.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<C, F, Fut> RootContextProvider<C> for ProviderFn<F>
where
    C: Send + Sync + 'static,
    F: Fn(RequestDescriptor) -> Fut + Send + Sync,
    Fut: Future<Output = Result<C, anyhow::Error>> + Send,
{
    async fn derive(&self, request: &RequestDescriptor) -> Result<C, anyhow::Error> {
        (self.0)(request.clone()).await
    }
}
