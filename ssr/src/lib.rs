//! Server-side dispatch for Pagecraft.
//!
//! This crate turns a matched route's [`PageResult`] into a transport
//! response: a redirect, a 404, an error page, or a fully composed HTML
//! document with SEO meta tags and a hydration payload for the client
//! bootstrap.
//!
//! # Request Flow
//!
//! 1. The transport hands over an [`InboundRequest`] (pathname, query,
//!    method, headers, cookies)
//! 2. The dispatcher matches it against the routes registry; no match is a
//!    404 before any page function runs
//! 3. The root context is derived, the page function invoked, failures
//!    caught into the `error` result
//! 4. The result tag selects the response: `Location` redirect, rendered
//!    404/error body, or the composed document
//!
//! # Example
//!
//! ```ignore
//! use pagecraft_ssr::{InboundRequest, SsrDispatcher};
//!
//! let dispatcher = SsrDispatcher::new(registry)
//!     .with_provider(provider)
//!     .with_render_hook(hook);
//!
//! let response = dispatcher.dispatch(&InboundRequest::get("/profile/42")).await?;
//! ```
//!
//! [`PageResult`]: pagecraft_core::result::PageResult

pub mod dispatcher;
pub mod document;
pub mod error;
pub mod render;
pub mod request;

pub use dispatcher::{SsrDispatcher, SsrResponse};
pub use document::{DocumentTemplate, HydrationPayload, HYDRATION_SCRIPT_ID, RENDER_TARGET_ID};
pub use error::SsrError;
pub use render::RenderHook;
pub use request::InboundRequest;
