// Copyright 2026 company-scout contributors
// SPDX-License-Identifier: Apache-2.0

//! Scrape orchestrator — keeps every source's collector running forever.
//!
//! Each source gets its own task. A task runs a pass, sleeps the inter-pass
//! interval, and repeats; a failed pass is logged and retried after a short
//! backoff. Tasks share nothing but the renderer and the record store, so a
//! failing source never stalls another one.

use crate::collector::{Collector, CollectorSettings, PassReport};
use crate::renderer::Renderer;
use crate::sources::{Source, SourceKind};
use anyhow::Result;
use company_scout::CompanyStore;
use futures::FutureExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Pacing for the forever loop.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    /// Pause after a successful pass.
    pub pass_interval: Duration,
    /// Pause after a failed pass.
    pub retry_backoff: Duration,
    /// Consecutive failures before a source is reported as degraded.
    pub max_consecutive_failures: u32,
}

/// Health of one source loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceHealth {
    Healthy,
    /// The failure cap was reached; the loop keeps retrying.
    Degraded,
}

/// Running totals for one source loop.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub health: SourceHealth,
    pub passes_ok: u64,
    pub passes_failed: u64,
    pub consecutive_failures: u32,
    pub new_records: u64,
    pub last_error: Option<String>,
}

impl Default for SourceStatus {
    fn default() -> Self {
        Self {
            health: SourceHealth::Healthy,
            passes_ok: 0,
            passes_failed: 0,
            consecutive_failures: 0,
            new_records: 0,
            last_error: None,
        }
    }
}

impl SourceStatus {
    /// Record a successful pass. Returns true when this recovers a degraded
    /// source.
    pub fn record_success(&mut self, report: &PassReport) -> bool {
        let recovered = self.health == SourceHealth::Degraded;
        self.health = SourceHealth::Healthy;
        self.passes_ok += 1;
        self.consecutive_failures = 0;
        self.new_records += report.new_records as u64;
        self.last_error = None;
        recovered
    }

    /// Record a failed pass. Returns true when this failure reaches `cap`
    /// and flips the source to degraded.
    pub fn record_failure(&mut self, error: &anyhow::Error, cap: u32) -> bool {
        self.passes_failed += 1;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(format!("{error:#}"));
        if self.health == SourceHealth::Healthy && self.consecutive_failures >= cap {
            self.health = SourceHealth::Degraded;
            return true;
        }
        false
    }
}

type StatusBoard = Arc<Mutex<BTreeMap<SourceKind, SourceStatus>>>;

/// Signals every source loop to stop at its next suspension point.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

/// Runs one collector loop per source.
pub struct Orchestrator {
    renderer: Arc<dyn Renderer>,
    collectors: Vec<Arc<Collector>>,
    settings: OrchestratorSettings,
    status: StatusBoard,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl Orchestrator {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        store: Arc<dyn CompanyStore>,
        sources: Vec<Source>,
        collector_settings: CollectorSettings,
        settings: OrchestratorSettings,
    ) -> Self {
        let collectors: Vec<Arc<Collector>> = sources
            .into_iter()
            .map(|source| {
                Arc::new(Collector::new(
                    source,
                    Arc::clone(&store),
                    collector_settings,
                ))
            })
            .collect();
        let status = collectors
            .iter()
            .map(|c| (c.kind(), SourceStatus::default()))
            .collect();
        let (tx, _rx) = watch::channel(false);
        Self {
            renderer,
            collectors,
            settings,
            status: Arc::new(Mutex::new(status)),
            shutdown_tx: Arc::new(tx),
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown_tx),
        }
    }

    /// Snapshot of every source's running totals.
    pub fn status(&self) -> BTreeMap<SourceKind, SourceStatus> {
        lock_board(&self.status).clone()
    }

    /// Run exactly one pass per source, concurrently.
    pub async fn run_once(&self) -> Vec<(SourceKind, Result<PassReport>)> {
        let passes = self.collectors.iter().map(|collector| {
            let renderer = Arc::clone(&self.renderer);
            async move {
                let outcome = guarded_pass(collector, renderer.as_ref()).await;
                (collector.kind(), outcome)
            }
        });
        futures::future::join_all(passes).await
    }

    /// Run every source loop until shutdown is signaled.
    pub async fn run(&self) -> Result<()> {
        tracing::info!(
            "orchestrator started: sources={} interval={}s backoff={}s failure_cap={}",
            self.collectors.len(),
            self.settings.pass_interval.as_secs(),
            self.settings.retry_backoff.as_secs(),
            self.settings.max_consecutive_failures
        );

        let handles: Vec<_> = self
            .collectors
            .iter()
            .map(|collector| {
                tokio::spawn(source_loop(
                    Arc::clone(collector),
                    Arc::clone(&self.renderer),
                    self.settings,
                    Arc::clone(&self.status),
                    self.shutdown_tx.subscribe(),
                ))
            })
            .collect();

        for (handle, collector) in handles.into_iter().zip(&self.collectors) {
            if let Err(e) = handle.await {
                tracing::error!("{} loop terminated abnormally: {e}", collector.kind());
            }
        }

        tracing::info!("orchestrator stopped");
        Ok(())
    }
}

fn lock_board(
    board: &StatusBoard,
) -> std::sync::MutexGuard<'_, BTreeMap<SourceKind, SourceStatus>> {
    board.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Run one pass, turning a panic inside it into a failed pass.
async fn guarded_pass(collector: &Collector, renderer: &dyn Renderer) -> Result<PassReport> {
    match AssertUnwindSafe(collector.run_pass(renderer))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(payload) => Err(anyhow::anyhow!(
            "pass panicked: {}",
            panic_message(payload.as_ref())
        )),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

async fn source_loop(
    collector: Arc<Collector>,
    renderer: Arc<dyn Renderer>,
    settings: OrchestratorSettings,
    status: StatusBoard,
    mut shutdown: watch::Receiver<bool>,
) {
    let kind = collector.kind();
    tracing::info!("{kind} loop started");

    while !*shutdown.borrow() {
        // Shutdown drops an in-flight pass; its tab closes with the browser.
        let outcome = tokio::select! {
            _ = shutdown.changed() => break,
            outcome = guarded_pass(&collector, renderer.as_ref()) => outcome,
        };

        let pause = {
            let mut board = lock_board(&status);
            let entry = board.entry(kind).or_default();
            match outcome {
                Ok(report) => {
                    tracing::info!(
                        "{kind} pass complete: {} new of {} extracted across {} view(s) in {}ms",
                        report.new_records,
                        report.extracted,
                        report.views,
                        report.duration_ms
                    );
                    if entry.record_success(&report) {
                        tracing::info!("{kind} recovered after failures");
                    }
                    settings.pass_interval
                }
                Err(e) => {
                    tracing::error!("{kind} pass failed: {e:#}");
                    if entry.record_failure(&e, settings.max_consecutive_failures) {
                        tracing::error!(
                            "{kind} degraded: {} consecutive failed passes",
                            entry.consecutive_failures
                        );
                    }
                    settings.retry_backoff
                }
            }
        };

        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tokio::time::sleep(pause) => {}
        }
    }

    tracing::info!("{kind} loop stopped");
}
