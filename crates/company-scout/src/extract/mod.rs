//! Page extraction rules.
//!
//! Each source site gets its own [`PageExtractor`]. The rules match the
//! site's markup by class-name substrings because the class names are
//! generated by the sites' frontend frameworks and change between builds.
//! A markup change should only ever require touching the matching rule here.
//!
//! Extraction is tolerant: an element that cannot be found degrades its field
//! to [`NOT_AVAILABLE`](crate::types::NOT_AVAILABLE), and a page without the
//! expected container yields no drafts plus a warning.

pub mod directory;
pub mod network;

pub use directory::DirectoryExtractor;
pub use network::NetworkExtractor;

use scraper::{ElementRef, Selector};

use crate::types::CompanyDraft;

/// Turns one rendered-page snapshot into company drafts.
///
/// Implementations are synchronous and pure; callers own the browser.
pub trait PageExtractor: Send + Sync {
    /// Short label used in log lines.
    fn label(&self) -> &str;

    /// Extract drafts in document order.
    fn extract(&self, html: &str) -> Vec<CompanyDraft>;
}

/// Whitespace-trimmed text content of the first descendant matching `selector`.
///
/// Blank text is reported as `None`.
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().and_then(element_text)
}

/// Whitespace-trimmed text content of `element`, or `None` when blank.
pub(crate) fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Compile a selector that is a constant of this crate.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("selector {css:?} is valid: {e:?}"))
}
