//! Extraction rule for professional-network company search results.
//!
//! Results are `li` items of a `role="list"` container. Only items carrying a
//! result title are companies; everything else in the list (ads, upsell
//! cards) is ignored.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{element_text, first_text, selector, PageExtractor};
use crate::types::{CompanyDraft, NOT_AVAILABLE};

struct Selectors {
    list: Selector,
    title_link: Selector,
    subtitle: Selector,
    summary: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        list: selector(r#"[role="list"]"#),
        title_link: selector(".entity-result__title-text a"),
        subtitle: selector(".entity-result__primary-subtitle"),
        summary: selector(".entity-result__summary"),
    })
}

/// Everything after the industry/location bullet separator.
///
/// The captured markup carries the bullet as the mis-decoded byte sequence
/// `â€¢`; the genuine `•` glyph is accepted as well.
fn location_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:â€¢|•)\s*(.*\S)").expect("location pattern is valid"))
}

/// Trailing accelerator batch label, e.g. `(YC S25)`.
fn batch_label_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\(YC\s+[^)]*\)\s*$").expect("batch pattern is valid"))
}

/// Location from a result subtitle, or [`NOT_AVAILABLE`] without a separator.
pub fn extract_location(subtitle: &str) -> String {
    location_pattern()
        .captures(subtitle)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Company name with the batch label removed.
pub fn strip_batch_label(name: &str) -> String {
    batch_label_pattern().replace(name, "").trim().to_string()
}

/// Rule B: company search results on the professional network.
#[derive(Debug, Clone, Default)]
pub struct NetworkExtractor;

impl NetworkExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_item(&self, item: ElementRef<'_>) -> Option<CompanyDraft> {
        let sel = selectors();
        let anchor = item.select(&sel.title_link).next()?;
        let name = strip_batch_label(&element_text(anchor)?);
        if name.is_empty() {
            return None;
        }

        let location = first_text(item, &sel.subtitle)
            .map(|text| extract_location(&text))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let summary = first_text(item, &sel.summary);

        Some(CompanyDraft::new(
            name,
            Some(location.as_str()),
            summary.as_deref(),
            anchor.value().attr("href"),
        ))
    }
}

impl PageExtractor for NetworkExtractor {
    fn label(&self) -> &str {
        "network"
    }

    fn extract(&self, html: &str) -> Vec<CompanyDraft> {
        let document = Html::parse_document(html);
        let sel = selectors();

        let lists: Vec<ElementRef<'_>> = document.select(&sel.list).collect();
        if lists.is_empty() {
            tracing::warn!("network: result list not found, the session may not be authenticated");
            return Vec::new();
        }

        let mut drafts = Vec::new();
        for list in lists {
            let items = list
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "li");
            for item in items {
                match self.extract_item(item) {
                    Some(draft) => {
                        tracing::debug!("network: company {} ({})", draft.name, draft.location);
                        drafts.push(draft);
                    }
                    None => tracing::trace!("network: skipping list item without a result title"),
                }
            }
        }
        drafts
    }
}
