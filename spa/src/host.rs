//! The navigation host: the dispatcher's seam to the browser.
//!
//! The hosting shell (History API wrapper, DOM access) implements this
//! trait; the dispatcher only ever asks for these three effects.

use pagecraft_core::seo::SeoDescriptor;

/// Browser-side effects the dispatcher may request.
pub trait NavigationHost: Send + Sync {
    /// Navigate to `path`, replacing the current history entry.
    ///
    /// Used for redirects so back-navigation does not loop through them.
    fn replace(&self, path: &str);

    /// Navigate to `path`, pushing a new history entry.
    fn push(&self, path: &str);

    /// Patch the document's title and meta tags in place from a resolved
    /// descriptor; the document itself is not re-rendered.
    fn apply_metadata(&self, seo: &SeoDescriptor);
}
