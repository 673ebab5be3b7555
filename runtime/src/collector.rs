//! Incremental collector — one navigate-to-exhaustion pass over a source.
//!
//! A pass walks `Navigating → ExtractingView → Advancing → ExtractingView …
//! → Exhausted`. Every view is extracted in full and each draft is checked
//! against the record store right before insert, so re-extracting companies
//! that were already seen earlier in the pass (or in an earlier pass) is
//! harmless.

use crate::renderer::{RenderContext, Renderer};
use crate::sources::{Advance, Source, SourceKind};
use anyhow::{Context, Result};
use company_scout::{CompanyDraft, CompanyStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Timing knobs for a pass.
#[derive(Debug, Clone, Copy)]
pub struct CollectorSettings {
    /// Upper bound on the initial navigation, readiness wait included.
    pub nav_timeout_ms: u64,
    /// Pause after scrolling or clicking before the view is measured again.
    pub settle: Duration,
}

/// Where a pass currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Navigating,
    ExtractingView,
    Advancing,
    Exhausted,
}

/// Outcome of one completed pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassReport {
    /// Views extracted (initial view plus one per successful advance).
    pub views: usize,
    /// Drafts returned by the extractor across all views.
    pub extracted: usize,
    /// Companies inserted during this pass.
    pub new_records: usize,
    pub duration_ms: u64,
}

/// Drives one source from navigation to exhaustion.
pub struct Collector {
    source: Source,
    store: Arc<dyn CompanyStore>,
    settings: CollectorSettings,
}

impl Collector {
    pub fn new(source: Source, store: Arc<dyn CompanyStore>, settings: CollectorSettings) -> Self {
        Self {
            source,
            store,
            settings,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.source.kind
    }

    /// Run one pass in a fresh browser context.
    ///
    /// The context is closed whether or not the pass succeeds.
    pub async fn run_pass(&self, renderer: &dyn Renderer) -> Result<PassReport> {
        let mut ctx = renderer
            .new_context()
            .await
            .context("failed to open browser context")?;
        let result = self.traverse(ctx.as_mut()).await;
        if let Err(e) = ctx.close().await {
            tracing::debug!("{}: closing browser context failed: {e}", self.source.kind);
        }
        result
    }

    /// Walk the state machine over an already-open context.
    pub async fn traverse(&self, ctx: &mut dyn RenderContext) -> Result<PassReport> {
        let kind = self.source.kind;
        let started = Instant::now();
        let mut report = PassReport::default();
        let mut last_height = 0u64;
        let mut state = CollectorState::Navigating;

        loop {
            tracing::trace!("{kind}: {state:?}");
            state = match state {
                CollectorState::Navigating => {
                    if !self.source.cookies.is_empty() {
                        ctx.set_cookies(&self.source.cookies).await?;
                    }
                    let nav = ctx
                        .navigate(
                            &self.source.url,
                            self.source.readiness,
                            self.settings.nav_timeout_ms,
                        )
                        .await?;
                    tracing::debug!("{kind}: loaded {} in {}ms", nav.final_url, nav.load_time_ms);
                    if self.source.advance == Advance::Scroll {
                        last_height = ctx.scroll_height().await?;
                    }
                    CollectorState::ExtractingView
                }
                CollectorState::ExtractingView => {
                    let html = ctx.get_html().await.context("failed to read page content")?;
                    let drafts = self.source.extractor.extract(&html);
                    let saved = self.persist_new(&drafts)?;
                    report.views += 1;
                    report.extracted += drafts.len();
                    report.new_records += saved;
                    tracing::info!(
                        "{kind}: view {} extracted {} companies, {saved} new",
                        report.views,
                        drafts.len()
                    );
                    CollectorState::Advancing
                }
                CollectorState::Advancing => match &self.source.advance {
                    Advance::Scroll => {
                        ctx.scroll_to_bottom().await?;
                        tokio::time::sleep(self.settings.settle).await;
                        let height = ctx.scroll_height().await?;
                        if height == last_height {
                            tracing::debug!("{kind}: page height settled at {height}px");
                            CollectorState::Exhausted
                        } else {
                            last_height = height;
                            CollectorState::ExtractingView
                        }
                    }
                    Advance::NextControl { selector } => {
                        if !ctx.has_element(selector).await? {
                            tracing::debug!("{kind}: no next control on the page");
                            CollectorState::Exhausted
                        } else if ctx.attribute(selector, "disabled").await?.is_some() {
                            tracing::debug!("{kind}: next control is disabled");
                            CollectorState::Exhausted
                        } else {
                            ctx.click(selector).await?;
                            tokio::time::sleep(self.settings.settle).await;
                            CollectorState::ExtractingView
                        }
                    }
                },
                CollectorState::Exhausted => break,
            };
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Insert every draft whose name is not stored yet. Returns the number
    /// inserted.
    fn persist_new(&self, drafts: &[CompanyDraft]) -> Result<usize> {
        let mut saved = 0;
        for draft in drafts {
            if self.store.find_by_name(&draft.name)?.is_some() {
                continue;
            }
            match self.store.create(draft) {
                Ok(_) => saved += 1,
                // Another collector inserted the same name since the lookup.
                Err(e) if e.is_integrity() => {
                    tracing::debug!("{}: {} already present", self.source.kind, draft.name);
                }
                Err(e) => return Err(e).context("failed to store company"),
            }
        }
        Ok(saved)
    }
}
