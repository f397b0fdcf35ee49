//! Client-navigation dispatch for Pagecraft.
//!
//! Mirrors the SSR dispatcher for in-browser navigation: the same page
//! function runs on every pathname change, but instead of a transport
//! response the result becomes observable side effects: navigate away,
//! publish view state, patch document metadata in place.
//!
//! The browser boundary is the injected [`NavigationHost`] trait; the
//! dispatcher itself owns no DOM or History API access, which keeps it
//! testable and keeps the business behavior identical to first load.
//!
//! Rapid navigations race; the dispatcher guarantees last-pathname-wins: a
//! resolution belonging to a pathname that is no longer current is discarded
//! and never mutates the exposed view state.

pub mod cache;
pub mod dispatcher;
pub mod host;

pub use cache::{CachePolicy, NavigationCache};
pub use dispatcher::{NavigationOutcome, SpaDispatcher, SpaOptions, ViewState};
pub use host::NavigationHost;
