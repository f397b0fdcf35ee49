//! The routes registry.
//!
//! An ordered collection of named route definitions, built once at
//! application start and immutable afterwards. Matching walks the routes in
//! registration order and the first hit wins; there is no specificity
//! ranking. Duplicate names and malformed patterns are fatal configuration
//! errors at construction, never runtime errors.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::page::PageFunction;
use crate::pattern::{PatternError, RoutePattern};
use crate::request::RouteParams;
use crate::seo::{ChangeFrequency, SeoConfig, SeoDescriptor};

/// Configuration errors raised while building a registry.
///
/// These abort startup; a registry with an invalid route table must never
/// come into existence.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two routes were registered under the same name.
    #[error("duplicate route name `{0}`")]
    DuplicateRouteName(String),

    /// A route pattern failed to parse.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Declarative cache hints for a route. Metadata only; the core implements
/// no caching itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheHints {
    /// Suggested time-to-live.
    pub ttl: Option<Duration>,
    /// Invalidation tags.
    pub tags: Vec<String>,
}

/// A route: a pattern, the page function behind it, and optional SEO and
/// cache configuration.
pub struct RouteDefinition<C> {
    pattern: RoutePattern,
    page: Arc<dyn PageFunction<C>>,
    seo: Option<SeoConfig>,
    cache: Option<CacheHints>,
}

impl<C: Send + Sync + 'static> RouteDefinition<C> {
    /// Define a route from a pattern string and a page function.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when the pattern is malformed.
    pub fn new(
        path: &str,
        page: impl PageFunction<C> + 'static,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: RoutePattern::parse(path)?,
            page: Arc::new(page),
            seo: None,
            cache: None,
        })
    }

    /// Attach SEO configuration.
    #[must_use]
    pub fn with_seo(mut self, seo: SeoConfig) -> Self {
        self.seo = Some(seo);
        self
    }

    /// Attach cache hints.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheHints) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The parsed route pattern.
    #[must_use]
    pub const fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// The page function.
    #[must_use]
    pub fn page(&self) -> Arc<dyn PageFunction<C>> {
        Arc::clone(&self.page)
    }

    /// The SEO configuration, if any.
    #[must_use]
    pub const fn seo(&self) -> Option<&SeoConfig> {
        self.seo.as_ref()
    }

    /// The cache hints, if any.
    #[must_use]
    pub const fn cache(&self) -> Option<&CacheHints> {
        self.cache.as_ref()
    }
}

impl<C> Clone for RouteDefinition<C> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            page: Arc::clone(&self.page),
            seo: self.seo.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<C> std::fmt::Debug for RouteDefinition<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("pattern", &self.pattern)
            .field("seo", &self.seo)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// A successful registry lookup.
#[derive(Debug)]
pub struct RouteMatch<'a, C> {
    /// Name the route was registered under.
    pub name: &'a str,
    /// The matched route definition.
    pub route: &'a RouteDefinition<C>,
    /// Parameters extracted from the pathname.
    pub params: RouteParams,
}

struct NamedRoute<C> {
    name: String,
    def: RouteDefinition<C>,
}

/// Builder for [`RoutesRegistry`]; validates on every insertion so a
/// configuration error surfaces at the registration site.
pub struct RoutesRegistryBuilder<C> {
    routes: Vec<NamedRoute<C>>,
}

impl<C: Send + Sync + 'static> RoutesRegistryBuilder<C> {
    /// Register a route from a name, a pattern string and a page function.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] for a duplicate name or malformed pattern.
    pub fn route(
        self,
        name: impl Into<String>,
        path: &str,
        page: impl PageFunction<C> + 'static,
    ) -> Result<Self, RegistryError> {
        self.route_def(name, RouteDefinition::new(path, page)?)
    }

    /// Register a prepared route definition.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRouteName`] when the name is taken.
    pub fn route_def(
        mut self,
        name: impl Into<String>,
        def: RouteDefinition<C>,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        if self.routes.iter().any(|r| r.name == name) {
            return Err(RegistryError::DuplicateRouteName(name));
        }
        self.routes.push(NamedRoute { name, def });
        Ok(self)
    }

    /// Finish construction. The registry is immutable from here on.
    #[must_use]
    pub fn build(self) -> RoutesRegistry<C> {
        RoutesRegistry {
            routes: self.routes,
        }
    }
}

/// An immutable, ordered collection of named routes.
pub struct RoutesRegistry<C> {
    routes: Vec<NamedRoute<C>>,
}

impl<C: Send + Sync + 'static> RoutesRegistry<C> {
    /// Start building a registry.
    #[must_use]
    pub const fn builder() -> RoutesRegistryBuilder<C> {
        RoutesRegistryBuilder { routes: Vec::new() }
    }

    /// Match a pathname against the registered routes in registration order.
    #[must_use]
    pub fn match_path(&self, pathname: &str) -> Option<RouteMatch<'_, C>> {
        self.routes.iter().find_map(|r| {
            r.def.pattern.matches(pathname).map(|params| RouteMatch {
                name: &r.name,
                route: &r.def,
                params,
            })
        })
    }

    /// Look up a route by its registered name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RouteDefinition<C>> {
        self.routes.iter().find(|r| r.name == name).map(|r| &r.def)
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered patterns in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.def.pattern.as_str())
    }

    /// Registered `(name, route)` pairs in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &RouteDefinition<C>)> {
        self.routes.iter().map(|r| (r.name.as_str(), &r.def))
    }

    /// Sitemap entries for every non-redirect route.
    ///
    /// Parameterized routes are represented by their un-instantiated
    /// pattern; SEO fields are resolved with an empty parameter map.
    /// Redirect-classified routes are excluded; they do not represent an
    /// indexable document.
    #[must_use]
    pub fn sitemap_entries(&self) -> Vec<SitemapEntry> {
        self.indexable_routes()
            .map(|(_, def, _)| {
                let hints = def.seo.as_ref().and_then(|s| s.sitemap);
                SitemapEntry {
                    url: def.pattern.as_str().to_string(),
                    lastmod: hints.and_then(|h| h.lastmod),
                    changefreq: hints
                        .and_then(|h| h.changefreq)
                        .unwrap_or_default(),
                    priority: hints.and_then(|h| h.priority).unwrap_or(0.5),
                }
            })
            .collect()
    }

    /// SEO manifest entries for every non-redirect route, with SEO fields
    /// resolved against an empty parameter map.
    #[must_use]
    pub fn seo_manifest(&self) -> Vec<SeoManifestEntry> {
        self.indexable_routes()
            .map(|(name, def, descriptor)| SeoManifestEntry {
                route_name: name.to_string(),
                path: def.pattern.as_str().to_string(),
                seo: descriptor,
            })
            .collect()
    }

    fn indexable_routes(
        &self,
    ) -> impl Iterator<Item = (&str, &RouteDefinition<C>, SeoDescriptor)> {
        self.routes.iter().filter_map(|r| {
            let descriptor = r
                .def
                .seo
                .as_ref()
                .map_or_else(SeoConfig::default, Clone::clone)
                .resolve(&r.name, &RouteParams::new());
            if descriptor.redirect.is_some() {
                return None;
            }
            Some((r.name.as_str(), &r.def, descriptor))
        })
    }
}

impl<C> std::fmt::Debug for RoutesRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutesRegistry")
            .field(
                "routes",
                &self
                    .routes
                    .iter()
                    .map(|r| (r.name.as_str(), r.def.pattern.as_str()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// One sitemap entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapEntry {
    /// URL (the route's un-instantiated pattern).
    pub url: String,
    /// Last-modified timestamp, when hinted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<DateTime<Utc>>,
    /// Change frequency; weekly unless hinted.
    pub changefreq: ChangeFrequency,
    /// Priority; 0.5 unless hinted.
    pub priority: f32,
}

/// One SEO manifest entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoManifestEntry {
    /// Name the route was registered under.
    pub route_name: String,
    /// The route's pattern string.
    pub path: String,
    /// The zero-argument resolved SEO descriptor.
    pub seo: SeoDescriptor,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::page::{PageInput, PageOutcome};
    use crate::result::PageResult;
    use crate::seo::{SeoRedirect, SitemapHints};
    use serde_json::json;

    async fn stub(_input: PageInput<()>) -> PageOutcome {
        Ok(PageResult::ok(json!({})))
    }

    fn registry() -> RoutesRegistry<()> {
        RoutesRegistry::builder()
            .route("home", "/", stub)
            .unwrap()
            .route("profile", "/profile/:id", stub)
            .unwrap()
            .route("catchier", "/profile/:name", stub)
            .unwrap()
            .build()
    }

    #[test]
    fn match_returns_name_route_and_params() {
        let registry = registry();
        let hit = registry.match_path("/profile/42").unwrap();
        assert_eq!(hit.name, "profile");
        assert_eq!(hit.params.get("id"), Some("42"));
    }

    #[test]
    fn registration_order_wins_over_specificity() {
        let registry = registry();
        // Both "profile" and "catchier" match; first registered wins.
        assert_eq!(registry.match_path("/profile/abc").unwrap().name, "profile");
    }

    #[test]
    fn no_match_returns_none() {
        assert!(registry().match_path("/unknown").is_none());
    }

    #[test]
    fn duplicate_names_are_fatal() {
        let result = RoutesRegistry::<()>::builder()
            .route("home", "/", stub)
            .unwrap()
            .route("home", "/other", stub);
        assert!(matches!(
            result,
            Err(RegistryError::DuplicateRouteName(name)) if name == "home"
        ));
    }

    #[test]
    fn malformed_patterns_are_fatal() {
        let result = RoutesRegistry::<()>::builder().route("bad", "/x/:", stub);
        assert!(matches!(result, Err(RegistryError::Pattern(_))));
    }

    #[test]
    fn patterns_enumerates_in_order() {
        let registry = registry();
        let patterns: Vec<&str> = registry.patterns().collect();
        assert_eq!(patterns, vec!["/", "/profile/:id", "/profile/:name"]);
    }

    #[test]
    fn sitemap_excludes_redirect_routes() {
        let registry = RoutesRegistry::<()>::builder()
            .route_def(
                "posts",
                RouteDefinition::new("/posts/:slug", stub).unwrap().with_seo(
                    SeoConfig::new().sitemap(SitemapHints {
                        priority: Some(0.9),
                        ..SitemapHints::default()
                    }),
                ),
            )
            .unwrap()
            .route_def(
                "legacy",
                RouteDefinition::new("/old-posts/:slug", stub)
                    .unwrap()
                    .with_seo(SeoConfig::new().redirect(SeoRedirect::to("/posts/:slug"))),
            )
            .unwrap()
            .build();

        let entries = registry.sitemap_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "/posts/:slug");
        assert!((entries[0].priority - 0.9).abs() < f32::EPSILON);
        assert_eq!(entries[0].changefreq, ChangeFrequency::Weekly);
    }

    #[test]
    fn manifest_resolves_with_empty_params_and_excludes_redirects() {
        let registry = RoutesRegistry::<()>::builder()
            .route_def(
                "about",
                RouteDefinition::new("/about", stub)
                    .unwrap()
                    .with_seo(SeoConfig::new().title("About us")),
            )
            .unwrap()
            .route_def(
                "legacy",
                RouteDefinition::new("/old", stub)
                    .unwrap()
                    .with_seo(SeoConfig::new().redirect(SeoRedirect::to("/about"))),
            )
            .unwrap()
            .build();

        let manifest = registry.seo_manifest();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest[0].route_name, "about");
        assert_eq!(manifest[0].path, "/about");
        assert_eq!(manifest[0].seo.title, "About us");
    }

    #[test]
    fn routes_without_seo_appear_with_minimal_descriptor() {
        let registry = registry();
        let manifest = registry.seo_manifest();
        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest[0].seo.title, "home");
    }
}
