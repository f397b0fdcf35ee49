//! # Pagecraft Testing
//!
//! Test doubles and builders for the Pagecraft toolkit.
//!
//! This crate provides:
//! - A recording [`NavigationHost`](pagecraft_spa::NavigationHost) double
//! - A fixed root-context provider
//! - Page-function and request-descriptor builders
//!
//! ## Example
//!
//! ```
//! use pagecraft_testing::mocks::RecordingHost;
//! use pagecraft_testing::helpers::ok_page;
//! use std::sync::Arc;
//!
//! let host = Arc::new(RecordingHost::new());
//! let page = ok_page::<()>(serde_json::json!({ "message": "Hi" }));
//! # let _ = (host, page);
//! ```

pub use helpers::{ok_page, request_for};
pub use mocks::{HostEffect, RecordingHost, StaticProvider};

/// Mock implementations of the dispatcher seams.
pub mod mocks {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pagecraft_core::context::RootContextProvider;
    use pagecraft_core::request::RequestDescriptor;
    use pagecraft_core::seo::SeoDescriptor;
    use pagecraft_spa::NavigationHost;

    /// One effect requested of the navigation host.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum HostEffect {
        /// History-replacing navigation.
        Replace(String),
        /// History-pushing navigation.
        Push(String),
        /// Document metadata patched; records the applied title.
        Metadata(String),
    }

    /// A [`NavigationHost`] that records every requested effect.
    #[derive(Debug, Default)]
    pub struct RecordingHost {
        effects: Mutex<Vec<HostEffect>>,
    }

    impl RecordingHost {
        /// An empty recorder.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Everything requested so far, in order.
        ///
        /// # Panics
        ///
        /// Panics if a previous test holder poisoned the lock.
        #[must_use]
        #[allow(clippy::unwrap_used)]
        pub fn effects(&self) -> Vec<HostEffect> {
            self.effects.lock().unwrap().clone()
        }

        #[allow(clippy::unwrap_used)]
        fn record(&self, effect: HostEffect) {
            self.effects.lock().unwrap().push(effect);
        }
    }

    impl NavigationHost for RecordingHost {
        fn replace(&self, path: &str) {
            self.record(HostEffect::Replace(path.to_string()));
        }

        fn push(&self, path: &str) {
            self.record(HostEffect::Push(path.to_string()));
        }

        fn apply_metadata(&self, seo: &SeoDescriptor) {
            self.record(HostEffect::Metadata(seo.title.clone()));
        }
    }

    /// A root-context provider returning a fixed clone.
    #[derive(Debug, Clone)]
    pub struct StaticProvider<C>(pub C);

    #[async_trait]
    impl<C> RootContextProvider<C> for StaticProvider<C>
    where
        C: Clone + Send + Sync + 'static,
    {
        async fn derive(&self, _request: &RequestDescriptor) -> Result<C, anyhow::Error> {
            Ok(self.0.clone())
        }
    }
}

/// Builders for common test fixtures.
pub mod helpers {
    use pagecraft_core::page::{PageFunction, PageInput, PageOutcome};
    use pagecraft_core::request::{RequestDescriptor, RouteParams};
    use pagecraft_core::result::PageResult;

    /// A page function that always returns `ok` with the given context.
    pub fn ok_page<C: Send + Sync + 'static>(
        context: serde_json::Value,
    ) -> impl PageFunction<C> + 'static {
        move |_input: PageInput<C>| {
            let context = context.clone();
            async move { PageOutcome::Ok(PageResult::ok(context)) }
        }
    }

    /// A request descriptor for a plain `GET` of `path` with the given
    /// parameters.
    #[must_use]
    pub fn request_for(path: &str, params: RouteParams) -> RequestDescriptor {
        RequestDescriptor::for_path(path).with_params(params)
    }
}

/// A small root context used across the workspace's own tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestContext {
    /// Locale, as a provider would derive it.
    pub locale: String,
    /// Request id, as a provider would stamp it.
    pub request_id: String,
}

impl Default for TestContext {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            request_id: "req-0".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::mocks::{HostEffect, RecordingHost};
    use pagecraft_core::seo::SeoConfig;
    use pagecraft_core::request::RouteParams;
    use pagecraft_spa::NavigationHost;

    #[test]
    fn recording_host_keeps_order() {
        let host = RecordingHost::new();
        host.replace("/a");
        host.push("/b");
        let seo = SeoConfig::new().title("T").resolve("t", &RouteParams::new());
        host.apply_metadata(&seo);

        assert_eq!(
            host.effects(),
            vec![
                HostEffect::Replace("/a".to_string()),
                HostEffect::Push("/b".to_string()),
                HostEffect::Metadata("T".to_string()),
            ]
        );
    }
}
