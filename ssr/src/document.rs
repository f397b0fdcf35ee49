//! Full-document composition: SEO meta tags, render target, hydration
//! payload and client bootstrap reference.
//!
//! The hydration payload is a single value object embedded in one well-known
//! `<script type="application/json">` element, parsed once by the client
//! bootstrap. It is not a set of ad hoc globals. Its JSON is embedded with `<`
//! escaped as `<` so page data can never close the script element.

use std::collections::HashMap;

use pagecraft_core::request::RouteParams;
use pagecraft_core::result::ResultKind;
use pagecraft_core::seo::SeoDescriptor;
use serde::{Deserialize, Serialize};

/// Element id of the embedded hydration payload script.
pub const HYDRATION_SCRIPT_ID: &str = "pagecraft-hydration";

/// Element id of the render target the client bootstrap mounts into.
pub const RENDER_TARGET_ID: &str = "pagecraft-root";

/// The value object handed from document composition to the client
/// bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrationPayload {
    /// Name of the matched route.
    pub route_name: String,
    /// Extracted route parameters.
    pub params: RouteParams,
    /// Decoded query pairs.
    pub query: HashMap<String, String>,
    /// Discriminant of the page result.
    pub result_type: ResultKind,
    /// The serialized route context.
    pub context: serde_json::Value,
}

/// Composes the full HTML document around a rendered fragment.
#[derive(Debug, Clone)]
pub struct DocumentTemplate {
    lang: String,
    default_title: String,
    render_target_id: String,
    hydration_script_id: String,
    bootstrap_src: Option<String>,
}

impl Default for DocumentTemplate {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            default_title: String::new(),
            render_target_id: RENDER_TARGET_ID.to_string(),
            hydration_script_id: HYDRATION_SCRIPT_ID.to_string(),
            bootstrap_src: None,
        }
    }
}

impl DocumentTemplate {
    /// A template with default ids and no bootstrap script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document language attribute.
    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Title used when the page carries no SEO descriptor.
    #[must_use]
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Reference the client bootstrap entry point (emitted as a module
    /// script).
    #[must_use]
    pub fn with_bootstrap(mut self, src: impl Into<String>) -> Self {
        self.bootstrap_src = Some(src.into());
        self
    }

    /// Compose the full document.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the hydration payload cannot be
    /// encoded as JSON.
    pub fn compose(
        &self,
        fragment: &str,
        seo: Option<&SeoDescriptor>,
        payload: Option<&HydrationPayload>,
    ) -> Result<String, serde_json::Error> {
        let mut head = String::new();
        head.push_str("<meta charset=\"utf-8\">\n");
        let title = seo.map_or(self.default_title.as_str(), |s| s.title.as_str());
        head.push_str(&format!("<title>{}</title>\n", escape_html(title)));
        if let Some(seo) = seo {
            head.push_str(&meta_tags(seo));
        }

        let mut body = format!(
            "<div id=\"{}\">{fragment}</div>\n",
            escape_html(&self.render_target_id)
        );
        if let Some(payload) = payload {
            let json = escape_json_for_script(&serde_json::to_string(payload)?);
            body.push_str(&format!(
                "<script type=\"application/json\" id=\"{}\">{json}</script>\n",
                escape_html(&self.hydration_script_id)
            ));
        }
        if let Some(src) = &self.bootstrap_src {
            body.push_str(&format!(
                "<script type=\"module\" src=\"{}\"></script>\n",
                escape_html(src)
            ));
        }

        Ok(format!(
            "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n{head}</head>\n<body>\n{body}</body>\n</html>\n",
            escape_html(&self.lang)
        ))
    }
}

fn meta_tags(seo: &SeoDescriptor) -> String {
    let mut tags = String::new();
    if !seo.description.is_empty() {
        push_meta(&mut tags, "name", "description", &seo.description);
    }
    if !(seo.robots.index && seo.robots.follow) {
        let content = format!(
            "{}, {}",
            if seo.robots.index { "index" } else { "noindex" },
            if seo.robots.follow { "follow" } else { "nofollow" },
        );
        push_meta(&mut tags, "name", "robots", &content);
    }
    if let Some(canonical) = &seo.canonical {
        tags.push_str(&format!(
            "<link rel=\"canonical\" href=\"{}\">\n",
            escape_html(canonical)
        ));
    }
    if let Some(og) = &seo.og {
        push_meta(&mut tags, "property", "og:title", &og.title);
        push_meta(&mut tags, "property", "og:description", &og.description);
        push_meta(&mut tags, "property", "og:type", &og.kind);
        if let Some(image) = &og.image {
            push_meta(&mut tags, "property", "og:image", image);
        }
        if let Some(url) = &og.url {
            push_meta(&mut tags, "property", "og:url", url);
        }
    }
    if let Some(twitter) = &seo.twitter {
        push_meta(&mut tags, "name", "twitter:card", &twitter.card);
        push_meta(&mut tags, "name", "twitter:title", &twitter.title);
        push_meta(&mut tags, "name", "twitter:description", &twitter.description);
        if let Some(image) = &twitter.image {
            push_meta(&mut tags, "name", "twitter:image", image);
        }
    }
    for (name, content) in &seo.meta {
        push_meta(&mut tags, "name", name, content);
    }
    tags
}

fn push_meta(tags: &mut String, attr: &str, name: &str, content: &str) {
    tags.push_str(&format!(
        "<meta {attr}=\"{}\" content=\"{}\">\n",
        escape_html(name),
        escape_html(content)
    ));
}

/// Escape text for HTML text and attribute positions.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape embedded JSON so data can never contain a raw `<`.
fn escape_json_for_script(json: &str) -> String {
    json.replace('<', "\\u003c")
}
