//! `scout run` — start the collectors.

use crate::cli::output;
use crate::config::ScoutConfig;
use crate::orchestrator::Orchestrator;
use crate::renderer::chromium::{ChromiumOptions, ChromiumRenderer};
use crate::renderer::Renderer;
use crate::sources::{self, SourceKind};
use anyhow::{Context, Result};
use company_scout::{CompanyStore, SqliteCompanyStore};
use std::sync::Arc;
use tracing::info;

/// Run the selected sources forever, or once with `once`.
pub async fn run(config: &ScoutConfig, kinds: &[SourceKind], once: bool) -> Result<()> {
    let store: Arc<dyn CompanyStore> = Arc::new(
        SqliteCompanyStore::open(&config.db_path)
            .with_context(|| format!("failed to open database {}", config.db_path.display()))?,
    );
    info!("record store at {}", config.db_path.display());

    let sources = sources::from_config(config, kinds)?;

    let renderer = ChromiumRenderer::launch(ChromiumOptions {
        executable: config.chromium_path.clone(),
        headless: config.headless,
        ..ChromiumOptions::default()
    })
    .await?;
    info!("Chromium renderer initialized");
    let renderer: Arc<dyn Renderer> = Arc::new(renderer);

    let orchestrator = Orchestrator::new(
        Arc::clone(&renderer),
        store,
        sources,
        config.collector_settings(),
        config.orchestrator_settings(),
    );

    if once {
        let results = orchestrator.run_once().await;
        renderer.shutdown().await?;
        return print_once(results);
    }

    let shutdown = orchestrator.shutdown_handle();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("received shutdown signal");
        shutdown.shutdown();
    });

    let result = orchestrator.run().await;
    renderer.shutdown().await?;
    result
}

fn print_once(
    results: Vec<(SourceKind, Result<crate::collector::PassReport>)>,
) -> Result<()> {
    let failed = results.iter().filter(|(_, r)| r.is_err()).count();

    if output::is_json() {
        let items: Vec<serde_json::Value> = results
            .iter()
            .map(|(kind, outcome)| match outcome {
                Ok(report) => serde_json::json!({
                    "source": kind,
                    "ok": true,
                    "report": report,
                }),
                Err(e) => serde_json::json!({
                    "source": kind,
                    "ok": false,
                    "error": format!("{e:#}"),
                }),
            })
            .collect();
        output::print_json(&serde_json::json!({ "passes": items }));
    } else if !output::is_quiet() {
        for (kind, outcome) in &results {
            match outcome {
                Ok(r) => println!(
                    "  {kind:<10} {} new / {} extracted, {} view(s), {}ms",
                    r.new_records, r.extracted, r.views, r.duration_ms
                ),
                Err(e) => println!("  {kind:<10} failed: {e:#}"),
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} source pass(es) failed");
    }
    Ok(())
}
