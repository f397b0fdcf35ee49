//! The SPA navigation dispatch state machine.
//!
//! Invoked once per pathname change (route-change detection is the host
//! router's concern). Matching, root-context derivation and page invocation
//! mirror the SSR dispatcher exactly; only the interpretation of the result
//! differs: side effects instead of a transport response.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use http::StatusCode;
use pagecraft_core::context::RootContextProvider;
use pagecraft_core::page::PageInput;
use pagecraft_core::registry::RoutesRegistry;
use pagecraft_core::request::{query_pairs, RequestDescriptor, RequestLine, RouteParams};
use pagecraft_core::result::{PageResult, ResultKind, RouteContext};
use pagecraft_core::seo::SeoDescriptor;
use tokio::sync::watch;

use crate::cache::{CachePolicy, NavigationCache};
use crate::host::NavigationHost;

/// Dispatcher configuration.
#[derive(Debug, Clone, Default)]
pub struct SpaOptions {
    /// Navigate here on a `not-found` result instead of rendering in place.
    pub not_found_path: Option<String>,
    /// Navigate here on an `error` result; absent means publish the error
    /// state and stay.
    pub error_path: Option<String>,
    /// Enable the navigation cache with this policy.
    pub cache: Option<CachePolicy>,
}

/// What the view layer currently has to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Name of the matched route.
    pub route_name: String,
    /// Extracted route parameters.
    pub params: RouteParams,
    /// The exposed context; `None` on the error branch.
    pub context: Option<RouteContext>,
    /// Which result branch produced this state.
    pub result: ResultKind,
}

/// The externally observable effect of one `navigate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// `ok`: context published, metadata patched.
    Rendered,
    /// `redirect`: history-replacing navigation issued.
    Redirected(String),
    /// `not-found` rendered in place with the optional fallback.
    NotFoundInPlace,
    /// `not-found` routed to the configured not-found path.
    NotFoundRouted(String),
    /// An extended terminal result (403/401/410/451) rendered in place.
    Halted(StatusCode),
    /// `error`: error state published (and error path navigated, when
    /// configured).
    Errored(StatusCode),
    /// No route matched; exposed context cleared, host router takes over.
    NoMatch,
    /// A newer navigation started before this one resolved; nothing was
    /// mutated.
    Superseded,
}

/// Client-navigation dispatcher over a routes registry.
pub struct SpaDispatcher<C: Send + Sync + 'static> {
    registry: Arc<RoutesRegistry<C>>,
    provider: Option<Arc<dyn RootContextProvider<C>>>,
    host: Arc<dyn NavigationHost>,
    options: SpaOptions,
    cache: Option<NavigationCache>,
    generation: AtomicU64,
    state: watch::Sender<Option<ViewState>>,
}

impl<C: Send + Sync + 'static> SpaDispatcher<C> {
    /// A dispatcher with default options and no root-context provider.
    #[must_use]
    pub fn new(registry: Arc<RoutesRegistry<C>>, host: Arc<dyn NavigationHost>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            registry,
            provider: None,
            host,
            options: SpaOptions::default(),
            cache: None,
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Configure the root-context provider.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn RootContextProvider<C>>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Configure dispatcher options (not-found path, error path, cache).
    #[must_use]
    pub fn with_options(mut self, options: SpaOptions) -> Self {
        self.cache = options.cache.map(NavigationCache::new);
        self.options = options;
        self
    }

    /// Subscribe to the exposed view state.
    #[must_use]
    pub fn view_state(&self) -> watch::Receiver<Option<ViewState>> {
        self.state.subscribe()
    }

    /// Dispatch one pathname change.
    ///
    /// Re-entrant: a call whose resolution arrives after a newer `navigate`
    /// has started returns [`NavigationOutcome::Superseded`] without
    /// touching the view state or the host.
    pub async fn navigate(&self, pathname: &str) -> NavigationOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (path, query_string) = match pathname.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (pathname, None),
        };
        tracing::debug!(path, generation, "navigation started");

        let Some(hit) = self.registry.match_path(path) else {
            // Defer to the host router's own not-found handling.
            if self.is_current(generation) {
                self.state.send_replace(None);
                return NavigationOutcome::NoMatch;
            }
            return NavigationOutcome::Superseded;
        };
        let route_name = hit.name.to_string();
        let params = hit.params.clone();

        let descriptor = RequestDescriptor {
            params: params.clone(),
            query: query_string.map(query_pairs).unwrap_or_default(),
            headers: std::collections::HashMap::new(),
            cookies: std::collections::HashMap::new(),
            request: Some(RequestLine::get(pathname)),
        };

        let result = match self.resolve(&hit, &descriptor, pathname).await {
            Ok(result) => result,
            Err(error) => Arc::new(PageResult::error(error)),
        };

        if !self.is_current(generation) {
            tracing::debug!(path, generation, "stale navigation discarded");
            return NavigationOutcome::Superseded;
        }

        self.apply(&route_name, params, &hit, &result)
    }

    /// Derive the root context and run the page function, through the cache
    /// when one is configured.
    async fn resolve(
        &self,
        hit: &pagecraft_core::registry::RouteMatch<'_, C>,
        descriptor: &RequestDescriptor,
        cache_key: &str,
    ) -> Result<Arc<PageResult>, anyhow::Error> {
        let root = match &self.provider {
            Some(provider) => Some(Arc::new(provider.derive(descriptor).await?)),
            None => None,
        };
        let mut input = PageInput::new(hit.params.clone(), descriptor.clone());
        if let Some(root) = root {
            input = input.with_root(root);
        }
        let page = hit.route.page();

        match &self.cache {
            Some(cache) => Ok(cache
                .get_or_run(cache_key, move || async move {
                    page.run(input).await.unwrap_or_else(PageResult::error)
                })
                .await),
            None => Ok(Arc::new(
                page.run(input).await.unwrap_or_else(PageResult::error),
            )),
        }
    }

    fn apply(
        &self,
        route_name: &str,
        params: RouteParams,
        hit: &pagecraft_core::registry::RouteMatch<'_, C>,
        result: &PageResult,
    ) -> NavigationOutcome {
        let status = result.status_code();
        match result {
            PageResult::Redirect { to, .. } => {
                // Replace, never push: back-navigation must not loop
                // through the redirect.
                self.host.replace(to);
                NavigationOutcome::Redirected(to.clone())
            },
            PageResult::NotFound { fallback } => match &self.options.not_found_path {
                Some(path) => {
                    self.host.replace(path);
                    NavigationOutcome::NotFoundRouted(path.clone())
                },
                None => {
                    self.publish(ViewState {
                        route_name: route_name.to_string(),
                        params,
                        context: fallback.clone(),
                        result: ResultKind::NotFound,
                    });
                    NavigationOutcome::NotFoundInPlace
                },
            },
            PageResult::Error { error, .. } => {
                tracing::warn!(error = %error, route = route_name, "page function failed");
                self.publish(ViewState {
                    route_name: route_name.to_string(),
                    params,
                    context: None,
                    result: ResultKind::Error,
                });
                if let Some(path) = &self.options.error_path {
                    self.host.replace(path);
                }
                NavigationOutcome::Errored(status)
            },
            PageResult::Forbidden { fallback }
            | PageResult::Unauthorized { fallback }
            | PageResult::Gone { fallback }
            | PageResult::UnavailableForLegalReasons { fallback } => {
                self.publish(ViewState {
                    route_name: route_name.to_string(),
                    params,
                    context: fallback.clone(),
                    result: result.kind(),
                });
                NavigationOutcome::Halted(status)
            },
            PageResult::Ok { context, seo, .. } => {
                let seo: Option<SeoDescriptor> = seo.clone().or_else(|| {
                    hit.route
                        .seo()
                        .map(|config| config.resolve(route_name, &params))
                });
                if let Some(seo) = &seo {
                    self.host.apply_metadata(seo);
                }
                self.publish(ViewState {
                    route_name: route_name.to_string(),
                    params,
                    context: Some(context.clone()),
                    result: ResultKind::Ok,
                });
                NavigationOutcome::Rendered
            },
        }
    }

    fn publish(&self, state: ViewState) {
        self.state.send_replace(Some(state));
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

impl<C: Send + Sync + 'static> std::fmt::Debug for SpaDispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaDispatcher")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
