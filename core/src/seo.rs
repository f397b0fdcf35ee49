//! SEO configuration and projection.
//!
//! A route's SEO configuration is declarative: every field is either a
//! literal value or a *pure* function of the route parameters. Resolution
//! ([`SeoConfig::resolve`]) is deterministic and performs no I/O: identical
//! parameters always yield structurally identical descriptors.
//!
//! Redirect-classified configurations short-circuit: the resolved descriptor
//! carries only the redirect, a title equal to the route name, an empty
//! description and `indexable: false` with both robots flags forced off. No
//! other field is ever populated on that descriptor.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::RouteParams;
use crate::result::RedirectStatus;

/// A pure derivation of a field value from route parameters.
pub type FieldFn<T> = Arc<dyn Fn(&RouteParams) -> T + Send + Sync>;

/// A configured SEO field: a literal, or a pure function of the parameters.
#[derive(Clone)]
pub enum SeoField<T> {
    /// A fixed value.
    Literal(T),
    /// Derived from the route parameters. The function must be pure and
    /// deterministic; no side effects, no asynchrony.
    Derived(FieldFn<T>),
}

impl<T: Clone> SeoField<T> {
    /// Resolve the field against the given parameters.
    #[must_use]
    pub fn resolve(&self, params: &RouteParams) -> T {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Derived(f) => f(params),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SeoField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

impl From<&str> for SeoField<String> {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for SeoField<String> {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<bool> for SeoField<bool> {
    fn from(value: bool) -> Self {
        Self::Literal(value)
    }
}

/// Build a derived field from a pure function of the parameters.
pub fn derived<T>(f: impl Fn(&RouteParams) -> T + Send + Sync + 'static) -> SeoField<T> {
    SeoField::Derived(Arc::new(f))
}

/// Robots directives; unset flags default from `indexable`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RobotsConfig {
    /// Explicit `index` directive.
    pub index: Option<bool>,
    /// Explicit `follow` directive.
    pub follow: Option<bool>,
}

/// Open Graph configuration; resolved only when present.
#[derive(Debug, Clone, Default)]
pub struct OpenGraphConfig {
    /// `og:title`; defaults to the resolved top-level title.
    pub title: Option<SeoField<String>>,
    /// `og:description`; defaults to the resolved top-level description.
    pub description: Option<SeoField<String>>,
    /// `og:image`.
    pub image: Option<SeoField<String>>,
    /// `og:url`.
    pub url: Option<SeoField<String>>,
    /// `og:type`; defaults to `website`.
    pub kind: Option<SeoField<String>>,
}

/// Twitter Card configuration; resolved only when present.
#[derive(Debug, Clone, Default)]
pub struct TwitterConfig {
    /// `twitter:card`; defaults to `summary`.
    pub card: Option<SeoField<String>>,
    /// `twitter:title`; defaults to the resolved top-level title.
    pub title: Option<SeoField<String>>,
    /// `twitter:description`; defaults to the resolved top-level description.
    pub description: Option<SeoField<String>>,
    /// `twitter:image`.
    pub image: Option<SeoField<String>>,
}

/// Marks a route as an SEO-classified redirect: the document no longer
/// exists at this URL. Defaults to 301 Moved Permanently.
#[derive(Debug, Clone)]
pub struct SeoRedirect {
    /// Redirect target.
    pub to: SeoField<String>,
    /// Redirect status; 301 unless overridden.
    pub status: RedirectStatus,
}

impl SeoRedirect {
    /// A permanent (301) redirect to the given target.
    #[must_use]
    pub fn to(target: impl Into<SeoField<String>>) -> Self {
        Self {
            to: target.into(),
            status: RedirectStatus::MovedPermanently,
        }
    }

    /// Override the redirect status.
    #[must_use]
    pub const fn with_status(mut self, status: RedirectStatus) -> Self {
        self.status = status;
        self
    }
}

/// How often a sitemap entry is expected to change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    /// Changes on every access.
    Always,
    /// Hourly.
    Hourly,
    /// Daily.
    Daily,
    /// Weekly (the default).
    #[default]
    Weekly,
    /// Monthly.
    Monthly,
    /// Yearly.
    Yearly,
    /// Never changes.
    Never,
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        };
        f.write_str(s)
    }
}

/// Declarative sitemap hints for a route.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SitemapHints {
    /// Last-modified timestamp.
    pub lastmod: Option<DateTime<Utc>>,
    /// Change frequency; weekly unless set.
    pub changefreq: Option<ChangeFrequency>,
    /// Priority in `0.0..=1.0`; 0.5 unless set.
    pub priority: Option<f32>,
}

/// Per-route SEO configuration.
#[derive(Debug, Clone, Default)]
pub struct SeoConfig {
    /// Document title; defaults to the route name.
    pub title: Option<SeoField<String>>,
    /// Meta description; defaults to empty.
    pub description: Option<SeoField<String>>,
    /// Canonical URL.
    pub canonical: Option<SeoField<String>>,
    /// Whether the document is indexable; defaults to `true`. `false`
    /// defaults both robots flags to `false` unless explicitly overridden.
    pub indexable: Option<SeoField<bool>>,
    /// Explicit robots directives.
    pub robots: Option<RobotsConfig>,
    /// Open Graph sub-object; omitted from the descriptor when absent.
    pub og: Option<OpenGraphConfig>,
    /// Twitter Card sub-object; omitted from the descriptor when absent.
    pub twitter: Option<TwitterConfig>,
    /// Additional named meta tags.
    pub meta: Option<BTreeMap<String, SeoField<String>>>,
    /// Marks this route as an SEO-classified redirect; forbids every other
    /// field on the resolved descriptor.
    pub redirect: Option<SeoRedirect>,
    /// Sitemap hints.
    pub sitemap: Option<SitemapHints>,
}

impl SeoConfig {
    /// An empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<SeoField<String>>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<SeoField<String>>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the canonical URL.
    #[must_use]
    pub fn canonical(mut self, canonical: impl Into<SeoField<String>>) -> Self {
        self.canonical = Some(canonical.into());
        self
    }

    /// Set indexability.
    #[must_use]
    pub fn indexable(mut self, indexable: impl Into<SeoField<bool>>) -> Self {
        self.indexable = Some(indexable.into());
        self
    }

    /// Set explicit robots directives.
    #[must_use]
    pub const fn robots(mut self, robots: RobotsConfig) -> Self {
        self.robots = Some(robots);
        self
    }

    /// Set the Open Graph sub-object.
    #[must_use]
    pub fn og(mut self, og: OpenGraphConfig) -> Self {
        self.og = Some(og);
        self
    }

    /// Set the Twitter Card sub-object.
    #[must_use]
    pub fn twitter(mut self, twitter: TwitterConfig) -> Self {
        self.twitter = Some(twitter);
        self
    }

    /// Add a named meta tag.
    #[must_use]
    pub fn meta(mut self, name: impl Into<String>, value: impl Into<SeoField<String>>) -> Self {
        self.meta
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Classify this route as an SEO redirect.
    #[must_use]
    pub fn redirect(mut self, redirect: SeoRedirect) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Set sitemap hints.
    #[must_use]
    pub const fn sitemap(mut self, hints: SitemapHints) -> Self {
        self.sitemap = Some(hints);
        self
    }

    /// Resolve this configuration into a descriptor.
    ///
    /// Pure and deterministic: for identical `params` the result is
    /// structurally identical. Redirect-classified configurations
    /// short-circuit and populate nothing but the redirect, the route-name
    /// title, an empty description and non-indexable robots flags.
    #[must_use]
    pub fn resolve(&self, route_name: &str, params: &RouteParams) -> SeoDescriptor {
        if let Some(redirect) = &self.redirect {
            return SeoDescriptor {
                title: route_name.to_string(),
                description: String::new(),
                canonical: None,
                indexable: false,
                robots: Robots {
                    index: false,
                    follow: false,
                },
                og: None,
                twitter: None,
                meta: BTreeMap::new(),
                redirect: Some(ResolvedRedirect {
                    to: redirect.to.resolve(params),
                    status: redirect.status,
                }),
            };
        }

        let title = self
            .title
            .as_ref()
            .map_or_else(|| route_name.to_string(), |t| t.resolve(params));
        let description = self
            .description
            .as_ref()
            .map_or_else(String::new, |d| d.resolve(params));
        let indexable = self
            .indexable
            .as_ref()
            .map_or(true, |i| i.resolve(params));

        let robots = {
            let explicit = self.robots.unwrap_or_default();
            Robots {
                index: explicit.index.unwrap_or(indexable),
                follow: explicit.follow.unwrap_or(indexable),
            }
        };

        let og = self.og.as_ref().map(|og| OpenGraph {
            title: og
                .title
                .as_ref()
                .map_or_else(|| title.clone(), |t| t.resolve(params)),
            description: og
                .description
                .as_ref()
                .map_or_else(|| description.clone(), |d| d.resolve(params)),
            image: og.image.as_ref().map(|i| i.resolve(params)),
            url: og.url.as_ref().map(|u| u.resolve(params)),
            kind: og
                .kind
                .as_ref()
                .map_or_else(|| "website".to_string(), |k| k.resolve(params)),
        });

        let twitter = self.twitter.as_ref().map(|tw| TwitterCard {
            card: tw
                .card
                .as_ref()
                .map_or_else(|| "summary".to_string(), |c| c.resolve(params)),
            title: tw
                .title
                .as_ref()
                .map_or_else(|| title.clone(), |t| t.resolve(params)),
            description: tw
                .description
                .as_ref()
                .map_or_else(|| description.clone(), |d| d.resolve(params)),
            image: tw.image.as_ref().map(|i| i.resolve(params)),
        });

        let meta = self.meta.as_ref().map_or_else(BTreeMap::new, |meta| {
            meta.iter()
                .map(|(name, field)| (name.clone(), field.resolve(params)))
                .collect()
        });

        SeoDescriptor {
            title,
            description,
            canonical: self.canonical.as_ref().map(|c| c.resolve(params)),
            indexable,
            robots,
            og,
            twitter,
            meta,
            redirect: None,
        }
    }
}

/// Resolved robots directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Robots {
    /// May be indexed.
    pub index: bool,
    /// Links may be followed.
    pub follow: bool,
}

/// Resolved Open Graph metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGraph {
    /// `og:title`.
    pub title: String,
    /// `og:description`.
    pub description: String,
    /// `og:image`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// `og:url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `og:type`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Resolved Twitter Card metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterCard {
    /// `twitter:card`.
    pub card: String,
    /// `twitter:title`.
    pub title: String,
    /// `twitter:description`.
    pub description: String,
    /// `twitter:image`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A resolved SEO redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRedirect {
    /// Redirect target.
    pub to: String,
    /// Redirect status.
    pub status: RedirectStatus,
}

/// Resolved document metadata for one route and parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoDescriptor {
    /// Document title.
    pub title: String,
    /// Meta description; may be empty.
    pub description: String,
    /// Canonical URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    /// Whether the document is indexable.
    pub indexable: bool,
    /// Robots directives.
    pub robots: Robots,
    /// Open Graph metadata; absent when not configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og: Option<OpenGraph>,
    /// Twitter Card metadata; absent when not configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<TwitterCard>,
    /// Additional named meta tags.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
    /// Present only on redirect-classified routes; excludes every other
    /// populated field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<ResolvedRedirect>,
}

impl SeoDescriptor {
    /// A minimal descriptor: route-name title, empty description, indexable.
    #[must_use]
    pub fn minimal(route_name: &str) -> Self {
        SeoConfig::default().resolve(route_name, &RouteParams::new())
    }
}
