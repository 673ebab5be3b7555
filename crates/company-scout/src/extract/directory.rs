//! Extraction rule for the open startup directory.
//!
//! Each company is an anchor card whose class contains `_company`; the name,
//! location and one-line pitch live in descendants with `coName`,
//! `coLocation` and `text-sm` class fragments.

use std::sync::OnceLock;

use scraper::{Html, Selector};
use url::Url;

use super::{element_text, first_text, selector, PageExtractor};
use crate::types::{CompanyDraft, ScoutResult};

/// Origin used to absolutize card links when none is configured.
pub const DEFAULT_DIRECTORY_ORIGIN: &str = "https://www.ycombinator.com";

struct Selectors {
    card: Selector,
    name: Selector,
    location: Selector,
    pitch_container: Selector,
    pitch: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        card: selector(r#"a[class*="_company"]"#),
        name: selector(r#"[class*="coName"]"#),
        location: selector(r#"[class*="coLocation"]"#),
        pitch_container: selector(r#"div[class*="text-sm"]"#),
        pitch: selector("span"),
    })
}

/// Rule A: company cards on the directory listing.
#[derive(Debug, Clone)]
pub struct DirectoryExtractor {
    origin: Url,
}

impl DirectoryExtractor {
    /// Create an extractor that resolves relative links against `origin`.
    pub fn new(origin: &str) -> ScoutResult<Self> {
        Ok(Self {
            origin: Url::parse(origin)?,
        })
    }

    fn resolve_link(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.origin.join(href).ok().map(|u| u.to_string())
    }
}

impl Default for DirectoryExtractor {
    fn default() -> Self {
        Self {
            origin: Url::parse(DEFAULT_DIRECTORY_ORIGIN).expect("default origin is a valid URL"),
        }
    }
}

impl PageExtractor for DirectoryExtractor {
    fn label(&self) -> &str {
        "directory"
    }

    fn extract(&self, html: &str) -> Vec<CompanyDraft> {
        let document = Html::parse_document(html);
        let sel = selectors();

        let mut cards = document.select(&sel.card).peekable();
        if cards.peek().is_none() {
            tracing::warn!("directory: no company cards found, the card class may have changed");
            return Vec::new();
        }

        let mut drafts = Vec::new();
        for card in cards {
            // Unnamed cards cannot be deduplicated, so they are dropped.
            let Some(name) = first_text(card, &sel.name) else {
                tracing::debug!("directory: skipping card without a name");
                continue;
            };

            let location = first_text(card, &sel.location);
            let pitch = card
                .select(&sel.pitch_container)
                .next()
                .and_then(|container| container.select(&sel.pitch).next())
                .and_then(element_text);
            let link = card
                .value()
                .attr("href")
                .and_then(|href| self.resolve_link(href));

            let draft = CompanyDraft::new(
                name,
                location.as_deref(),
                pitch.as_deref(),
                link.as_deref(),
            );
            tracing::debug!(
                "directory: company {} ({}) {}",
                draft.name,
                draft.location,
                draft.link
            );
            drafts.push(draft);
        }
        drafts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NOT_AVAILABLE;

    fn card(name: &str, location: &str, pitch: &str, href: &str) -> String {
        format!(
            r#"<a class="_company_86jzd_338" href="{href}">
                 <div><span class="_coName_86jzd_453">{name}</span>
                      <span class="_coLocation_86jzd_469">{location}</span></div>
                 <div class="mb-1.5 text-sm"><span>{pitch}</span><span>ignored</span></div>
               </a>"#
        )
    }

    fn page(cards: &[String]) -> String {
        format!(
            "<html><body><div class=\"_section_86jzd_146\">{}</div></body></html>",
            cards.join("\n")
        )
    }

    #[test]
    fn extracts_cards_in_order() {
        let html = page(&[
            card("Acme", "San Francisco, CA, USA", "Rockets for everyone", "/companies/acme"),
            card("Beta Labs", "Remote", "Testing tools", "/companies/beta-labs"),
        ]);
        let drafts = DirectoryExtractor::default().extract(&html);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].name, "Acme");
        assert_eq!(drafts[0].location, "San Francisco, CA, USA");
        assert_eq!(drafts[0].description, "Rockets for everyone");
        assert_eq!(drafts[0].link, "https://www.ycombinator.com/companies/acme");
        assert_eq!(drafts[1].name, "Beta Labs");
    }

    #[test]
    fn missing_fields_become_sentinel() {
        let html = page(&[r#"<a class="x_company_y"><span class="coName"> Solo </span></a>"#
            .to_string()]);
        let drafts = DirectoryExtractor::default().extract(&html);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].name, "Solo");
        assert_eq!(drafts[0].location, NOT_AVAILABLE);
        assert_eq!(drafts[0].description, NOT_AVAILABLE);
        assert_eq!(drafts[0].link, NOT_AVAILABLE);
    }

    #[test]
    fn unnamed_cards_are_skipped() {
        let html = page(&[
            card("", "Nowhere", "No name", "/companies/anon"),
            card("   ", "Nowhere", "Blank name", "/companies/blank"),
            r#"<a class="_company_1" href="/companies/none"><span class="coLocation">NYC</span></a>"#
                .to_string(),
            card("Named", "NYC", "Has a name", "/companies/named"),
        ]);
        let drafts = DirectoryExtractor::default().extract(&html);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].name, "Named");
    }

    #[test]
    fn page_without_cards_is_empty() {
        let html = "<html><body><a class=\"nav\" href=\"/\">Home</a></body></html>";
        assert!(DirectoryExtractor::default().extract(html).is_empty());
        assert!(DirectoryExtractor::default().extract("").is_empty());
    }

    #[test]
    fn absolute_links_are_kept() {
        let html = page(&[card("Ext", "X", "Y", "https://example.com/acme")]);
        let drafts = DirectoryExtractor::new("https://www.ycombinator.com")
            .unwrap()
            .extract(&html);
        assert_eq!(drafts[0].link, "https://example.com/acme");
    }

    #[test]
    fn rejects_invalid_origin() {
        assert!(DirectoryExtractor::new("not a url").is_err());
    }
}
