//! The two scraped sources and how each one is traversed.

use crate::config::ScoutConfig;
use crate::renderer::Readiness;
use anyhow::Result;
use company_scout::{Cookie, DirectoryExtractor, NetworkExtractor, PageExtractor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which site a source scrapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Open startup directory, revealed by infinite scroll.
    Directory,
    /// Cookie-gated professional-network search, revealed by pagination.
    Network,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a collector reveals more content once the current view is extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Scroll to the bottom; unchanged page height means exhausted.
    Scroll,
    /// Click the control at `selector`; a disabled or missing control means
    /// exhausted.
    NextControl { selector: String },
}

/// Everything a collector needs to traverse one site.
#[derive(Clone)]
pub struct Source {
    pub kind: SourceKind,
    pub url: String,
    pub readiness: Readiness,
    pub advance: Advance,
    pub extractor: Arc<dyn PageExtractor>,
    pub cookies: Vec<Cookie>,
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("readiness", &self.readiness)
            .field("advance", &self.advance)
            .field("extractor", &self.extractor.label())
            .field("cookies", &self.cookies.len())
            .finish()
    }
}

impl Source {
    /// The open directory: waits for network idle and scrolls.
    pub fn directory(url: impl Into<String>, origin: &str) -> Result<Self> {
        Ok(Self {
            kind: SourceKind::Directory,
            url: url.into(),
            readiness: Readiness::NetworkIdle,
            advance: Advance::Scroll,
            extractor: Arc::new(DirectoryExtractor::new(origin)?),
            cookies: Vec::new(),
        })
    }

    /// The gated search: waits for load and paginates with `next_selector`.
    pub fn network(
        url: impl Into<String>,
        next_selector: impl Into<String>,
        cookies: Vec<Cookie>,
    ) -> Self {
        Self {
            kind: SourceKind::Network,
            url: url.into(),
            readiness: Readiness::Load,
            advance: Advance::NextControl {
                selector: next_selector.into(),
            },
            extractor: Arc::new(NetworkExtractor::new()),
            cookies,
        }
    }
}

/// Build the sources selected by `kinds` from configuration.
///
/// The cookie file is only read when the network source is selected.
pub fn from_config(config: &ScoutConfig, kinds: &[SourceKind]) -> Result<Vec<Source>> {
    let mut sources = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let source = match kind {
            SourceKind::Directory => {
                Source::directory(config.directory_url.clone(), &config.directory_origin)?
            }
            SourceKind::Network => {
                let cookies = company_scout::load_cookies(&config.cookie_file);
                if cookies.is_empty() {
                    tracing::warn!(
                        "network source has no cookies; search results will likely require sign-in"
                    );
                }
                Source::network(
                    config.network_url.clone(),
                    config.network_next_selector.clone(),
                    cookies,
                )
            }
        };
        sources.push(source);
    }
    Ok(sources)
}
