//! The SSR dispatch state machine.
//!
//! Invoked once per inbound request. Matching, root-context derivation, page
//! invocation and branching follow one fixed order; every failure mode lands
//! on exactly one branch of the page-result taxonomy, so the transport
//! always receives a response.

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use http::{header, HeaderName, StatusCode};
use pagecraft_core::context::RootContextProvider;
use pagecraft_core::page::PageInput;
use pagecraft_core::registry::RoutesRegistry;
use pagecraft_core::result::PageResult;
use tracing::Instrument;

use crate::document::{DocumentTemplate, HydrationPayload};
use crate::error::SsrError;
use crate::render::{default_not_found, default_status, RenderHook};
use crate::request::InboundRequest;

/// The transport-facing response produced by a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsrResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: Vec<(HeaderName, String)>,
    /// HTML body; empty on redirects.
    pub body: String,
}

impl SsrResponse {
    fn html(status: StatusCode, body: String) -> Self {
        Self {
            status,
            headers: vec![(
                header::CONTENT_TYPE,
                "text/html; charset=utf-8".to_string(),
            )],
            body,
        }
    }

    fn redirect(to: &str, status: StatusCode) -> Self {
        Self {
            status,
            headers: vec![(header::LOCATION, to.to_string())],
            body: String::new(),
        }
    }

    /// The `Location` header value, when this is a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| *name == header::LOCATION)
            .map(|(_, value)| value.as_str())
    }
}

impl IntoResponse for SsrResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        for (name, value) in self.headers {
            if let Ok(value) = value.parse() {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}

/// Server-side dispatcher over a routes registry.
pub struct SsrDispatcher<C: Send + Sync + 'static> {
    registry: Arc<RoutesRegistry<C>>,
    provider: Option<Arc<dyn RootContextProvider<C>>>,
    render: Option<Arc<dyn RenderHook>>,
    template: DocumentTemplate,
}

impl<C: Send + Sync + 'static> SsrDispatcher<C> {
    /// A dispatcher with no provider, no render hook and the default
    /// template.
    #[must_use]
    pub fn new(registry: Arc<RoutesRegistry<C>>) -> Self {
        Self {
            registry,
            provider: None,
            render: None,
            template: DocumentTemplate::default(),
        }
    }

    /// Configure the root-context provider.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn RootContextProvider<C>>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Configure the render hook.
    #[must_use]
    pub fn with_render_hook(mut self, hook: Arc<dyn RenderHook>) -> Self {
        self.render = Some(hook);
        self
    }

    /// Configure the document template.
    #[must_use]
    pub fn with_template(mut self, template: DocumentTemplate) -> Self {
        self.template = template;
        self
    }

    /// Dispatch one inbound request to a transport response.
    ///
    /// # Errors
    ///
    /// Returns [`SsrError`] when a render hook fails or the hydration
    /// payload cannot be serialized; page-function failures never surface
    /// here, they become an error response.
    pub async fn dispatch(&self, inbound: &InboundRequest) -> Result<SsrResponse, SsrError> {
        let span = tracing::info_span!("ssr_dispatch", path = %inbound.path);
        self.dispatch_inner(inbound).instrument(span).await
    }

    async fn dispatch_inner(&self, inbound: &InboundRequest) -> Result<SsrResponse, SsrError> {
        let Some(hit) = self.registry.match_path(&inbound.path) else {
            tracing::debug!("no route matched");
            let body = match &self.render {
                Some(hook) => hook
                    .render_not_found(None)
                    .await
                    .map_err(SsrError::Render)?,
                None => default_not_found(),
            };
            return Ok(SsrResponse::html(StatusCode::NOT_FOUND, body));
        };

        let route_name = hit.name.to_string();
        let descriptor = inbound.descriptor(hit.params.clone());

        let result = match self.derive_root(&descriptor).await {
            Ok(root) => {
                let mut input = PageInput::new(hit.params.clone(), descriptor.clone());
                if let Some(root) = root {
                    input = input.with_root(root);
                }
                hit.route
                    .page()
                    .run(input)
                    .await
                    .unwrap_or_else(PageResult::error)
            },
            Err(error) => PageResult::error(error),
        };

        let status = result.status_code();
        tracing::info!(route = %route_name, status = %status, kind = ?result.kind(), "dispatched");

        match result {
            PageResult::Redirect { to, status } => {
                Ok(SsrResponse::redirect(&to, status.status()))
            },
            PageResult::NotFound { fallback } => {
                let body = match &self.render {
                    Some(hook) => hook
                        .render_not_found(fallback.as_ref())
                        .await
                        .map_err(SsrError::Render)?,
                    None => default_not_found(),
                };
                Ok(SsrResponse::html(StatusCode::NOT_FOUND, body))
            },
            PageResult::Error { error, .. } => {
                tracing::warn!(error = %error, "page function failed");
                let body = self.render_status_branch(status, None).await?;
                Ok(SsrResponse::html(status, body))
            },
            PageResult::Forbidden { fallback }
            | PageResult::Unauthorized { fallback }
            | PageResult::Gone { fallback }
            | PageResult::UnavailableForLegalReasons { fallback } => {
                let body = self.render_status_branch(status, fallback.as_ref()).await?;
                Ok(SsrResponse::html(status, body))
            },
            PageResult::Ok { context, seo, .. } => {
                let seo = seo.or_else(|| {
                    hit.route
                        .seo()
                        .map(|config| config.resolve(&route_name, &hit.params))
                });
                let fragment = match &self.render {
                    Some(hook) => hook
                        .render_page(&context, seo.as_ref(), &descriptor)
                        .await
                        .map_err(SsrError::Render)?,
                    None => String::new(),
                };
                let payload = HydrationPayload {
                    route_name,
                    params: hit.params,
                    query: descriptor.query,
                    result_type: pagecraft_core::result::ResultKind::Ok,
                    context: context.into_value(),
                };
                let document =
                    self.template
                        .compose(&fragment, seo.as_ref(), Some(&payload))?;
                Ok(SsrResponse::html(status, document))
            },
        }
    }

    async fn derive_root(
        &self,
        descriptor: &pagecraft_core::request::RequestDescriptor,
    ) -> Result<Option<Arc<C>>, anyhow::Error> {
        match &self.provider {
            Some(provider) => Ok(Some(Arc::new(provider.derive(descriptor).await?))),
            None => Ok(None),
        }
    }

    async fn render_status_branch(
        &self,
        status: StatusCode,
        fallback: Option<&pagecraft_core::result::RouteContext>,
    ) -> Result<String, SsrError> {
        match &self.render {
            Some(hook) => hook
                .render_status(status, fallback)
                .await
                .map_err(SsrError::Render),
            None => Ok(default_status(status)),
        }
    }
}

impl<C: Send + Sync + 'static> std::fmt::Debug for SsrDispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsrDispatcher")
            .field("registry", &self.registry)
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}
