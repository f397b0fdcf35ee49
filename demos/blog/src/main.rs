//! A small blog served through the Pagecraft SSR dispatcher.
//!
//! Three routes: an index, a post page with a derived SEO title, and a
//! legacy path that permanently redirects to the new post URL. The sitemap
//! and SEO manifest are projected straight from the routes registry.

use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use http::header;
use pagecraft_core::context::RootContextProvider;
use pagecraft_core::page::{PageInput, PageOutcome};
use pagecraft_core::registry::{RegistryError, RouteDefinition, RoutesRegistry};
use pagecraft_core::request::{RequestDescriptor, RouteParams};
use pagecraft_core::result::{PageResult, RouteContext};
use pagecraft_core::seo::{SeoConfig, SeoDescriptor, SeoRedirect, derived};
use pagecraft_ssr::{DocumentTemplate, InboundRequest, RenderHook, SsrDispatcher};
use serde_json::json;

const POSTS: &[(&str, &str, &str)] = &[
    ("hello-pagecraft", "Hello Pagecraft", "A page function runs the same on first load and on navigation."),
    ("routing-notes", "Routing Notes", "Patterns, parameters and trailing optional segments."),
];

struct SiteContext {
    site_name: String,
}

struct SiteProvider;

#[async_trait]
impl RootContextProvider<SiteContext> for SiteProvider {
    async fn derive(&self, _request: &RequestDescriptor) -> Result<SiteContext, anyhow::Error> {
        Ok(SiteContext {
            site_name: "Pagecraft Blog".to_string(),
        })
    }
}

async fn home(input: PageInput<SiteContext>) -> PageOutcome {
    let site_name = input
        .root
        .as_deref()
        .map_or("", |c| c.site_name.as_str());
    let posts: Vec<serde_json::Value> = POSTS
        .iter()
        .map(|(slug, title, _)| json!({ "slug": slug, "title": title }))
        .collect();
    Ok(PageResult::ok(json!({ "site": site_name, "posts": posts })))
}

async fn post(input: PageInput<SiteContext>) -> PageOutcome {
    let slug = input.params.get("slug").unwrap_or_default();
    match POSTS.iter().find(|(s, ..)| *s == slug) {
        Some((_, title, body)) => {
            Ok(PageResult::ok(json!({ "title": title, "body": body })))
        },
        None => Ok(PageResult::not_found().with_fallback(json!({ "slug": slug }))),
    }
}

async fn legacy_post(input: PageInput<SiteContext>) -> PageOutcome {
    let slug = input.params.get("slug").unwrap_or_default();
    Ok(PageResult::redirect_permanent(format!("/posts/{slug}")))
}

fn build_registry() -> Result<RoutesRegistry<SiteContext>, RegistryError> {
    Ok(RoutesRegistry::builder()
        .route_def(
            "home",
            RouteDefinition::new("/", home)?.with_seo(
                SeoConfig::new()
                    .title("Pagecraft Blog")
                    .description("Notes on page contracts and routing"),
            ),
        )?
        .route_def(
            "post",
            RouteDefinition::new("/posts/:slug", post)?.with_seo(
                SeoConfig::new().title(derived(|params: &RouteParams| {
                    POSTS
                        .iter()
                        .find(|(slug, ..)| Some(*slug) == params.get("slug"))
                        .map_or_else(
                            || "Post".to_string(),
                            |(_, title, _)| (*title).to_string(),
                        )
                })),
            ),
        )?
        .route_def(
            "legacy_post",
            RouteDefinition::new("/blog/:slug", legacy_post)?.with_seo(
                SeoConfig::new().redirect(SeoRedirect::to(derived(
                    |params: &RouteParams| {
                        format!("/posts/{}", params.get("slug").unwrap_or_default())
                    },
                ))),
            ),
        )?
        .build())
}

struct BlogRenderer;

#[async_trait]
impl RenderHook for BlogRenderer {
    async fn render_page(
        &self,
        context: &RouteContext,
        seo: Option<&SeoDescriptor>,
        _request: &RequestDescriptor,
    ) -> Result<String, anyhow::Error> {
        let heading = seo.map_or("Pagecraft", |s| s.title.as_str());
        let body = context.value()["body"].as_str().unwrap_or("");
        Ok(format!("<main><h1>{heading}</h1><p>{body}</p></main>"))
    }
}

#[derive(Clone)]
struct AppState {
    registry: Arc<RoutesRegistry<SiteContext>>,
    dispatcher: Arc<SsrDispatcher<SiteContext>>,
}

async fn dispatch(
    State(state): State<AppState>,
    request: axum::extract::Request,
) -> axum::response::Response {
    let (parts, _body) = request.into_parts();
    let inbound = InboundRequest::from_parts(&parts);
    match state.dispatcher.dispatch(&inbound).await {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

async fn sitemap(State(state): State<AppState>) -> impl IntoResponse {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in state.registry.sitemap_entries() {
        xml.push_str(&format!(
            "  <url><loc>{}</loc><changefreq>{}</changefreq><priority>{}</priority></url>\n",
            entry.url, entry.changefreq, entry.priority
        ));
    }
    xml.push_str("</urlset>\n");
    ([(header::CONTENT_TYPE, "application/xml")], xml)
}

async fn seo_manifest(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.registry.seo_manifest())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let registry = Arc::new(build_registry().context("building routes registry")?);
    let dispatcher = Arc::new(
        SsrDispatcher::new(Arc::clone(&registry))
            .with_provider(Arc::new(SiteProvider))
            .with_render_hook(Arc::new(BlogRenderer))
            .with_template(
                DocumentTemplate::new()
                    .with_lang("en")
                    .with_default_title("Pagecraft Blog"),
            ),
    );

    let app = Router::new()
        .route("/sitemap.xml", get(sitemap))
        .route("/seo-manifest.json", get(seo_manifest))
        .fallback(dispatch)
        .with_state(AppState {
            registry,
            dispatcher,
        });

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .context("binding listener")?;
    tracing::info!(address = %listener.local_addr()?, "listening");
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
