//! # Pagecraft Core
//!
//! Contracts and pure logic for the Pagecraft page-contract execution model.
//!
//! A *page function* is the unit of business logic per route: given route
//! parameters and an application-wide root context, it produces a tagged
//! [`PageResult`](result::PageResult). The same page function is executed by
//! the server-side dispatcher (`pagecraft-ssr`) on first load and by the
//! client-side dispatcher (`pagecraft-spa`) on every subsequent navigation,
//! which is what keeps both environments behaviorally identical.
//!
//! ## Core Concepts
//!
//! - **Route pattern**: `/`-separated literal and `:name` / `:name?` segments,
//!   parsed once at registry construction
//! - **Page function**: `(params, root context, request) → PageResult`
//! - **Page result**: discriminated outcome (ok / redirect / not-found /
//!   error / forbidden / unauthorized / gone / unavailable-for-legal-reasons)
//! - **Root context**: application-supplied per-request value derived from the
//!   request descriptor
//! - **SEO projection**: pure, deterministic derivation of document metadata
//!   from a route's SEO configuration and its parameters
//!
//! ## Example
//!
//! ```
//! use pagecraft_core::prelude::*;
//! use serde_json::json;
//!
//! async fn profile(input: PageInput<()>) -> PageOutcome {
//!     let id = input.params.get("id").unwrap_or_default().to_string();
//!     Ok(PageResult::ok(json!({ "profile_id": id })))
//! }
//!
//! let registry: RoutesRegistry<()> = RoutesRegistry::builder()
//!     .route("profile", "/profile/:id", profile)
//!     .unwrap()
//!     .build();
//!
//! let hit = registry.match_path("/profile/42").unwrap();
//! assert_eq!(hit.name, "profile");
//! assert_eq!(hit.params.get("id"), Some("42"));
//! ```

pub mod context;
pub mod page;
pub mod pattern;
pub mod registry;
pub mod request;
pub mod result;
pub mod seo;

/// Commonly used types, re-exported for application code.
pub mod prelude {
    pub use crate::context::{ProviderFn, RootContextProvider};
    pub use crate::page::{PageFunction, PageInput, PageOutcome};
    pub use crate::pattern::{PatternError, RoutePattern};
    pub use crate::registry::{
        RegistryError, RouteDefinition, RouteMatch, RoutesRegistry, RoutesRegistryBuilder,
    };
    pub use crate::request::{RequestDescriptor, RequestLine, RouteParams};
    pub use crate::result::{PageResult, RedirectStatus, ResultKind, RouteContext};
    pub use crate::seo::{SeoConfig, SeoDescriptor, SeoRedirect};
}

pub use context::RootContextProvider;
pub use page::{PageFunction, PageInput, PageOutcome};
pub use pattern::RoutePattern;
pub use registry::RoutesRegistry;
pub use request::{RequestDescriptor, RouteParams};
pub use result::{PageResult, ResultKind, RouteContext};
pub use seo::{SeoConfig, SeoDescriptor};
