// Copyright 2026 company-scout contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use scout_runtime::cli;
use scout_runtime::config::ScoutConfig;
use scout_runtime::sources::SourceKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "scout",
    about = "Company Scout — continuous collector for startup company listings",
    version,
    after_help = "Run 'scout <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Database file (overrides SCOUT_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect companies continuously until interrupted
    Run {
        /// Which source(s) to collect from
        #[arg(long, value_enum, default_value = "all")]
        source: SourceArg,
        /// Run a single pass per source and exit
        #[arg(long)]
        once: bool,
    },
    /// Show stored companies, newest first
    List {
        /// Maximum number of rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Validate a cookie export file
    Cookies {
        /// Cookie file (defaults to SCOUT_COOKIE_FILE)
        path: Option<PathBuf>,
    },
    /// Check the environment for readiness
    Doctor,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Directory,
    Network,
    All,
}

impl SourceArg {
    fn kinds(self) -> Vec<SourceKind> {
        match self {
            SourceArg::Directory => vec![SourceKind::Directory],
            SourceArg::Network => vec![SourceKind::Network],
            SourceArg::All => vec![SourceKind::Directory, SourceKind::Network],
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose { "debug" } else { cli.log_level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "warn,scout_runtime={level},company_scout={level}"
        ))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("SCOUT_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("SCOUT_QUIET", "1");
    }

    init_logging(&cli);

    let mut config = ScoutConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }

    let result = match cli.command {
        Commands::Run { source, once } => cli::run_cmd::run(&config, &source.kinds(), once).await,
        Commands::List { limit } => cli::list_cmd::run(&config, limit).await,
        Commands::Cookies { path } => {
            let path = path.unwrap_or_else(|| config.cookie_file.clone());
            cli::cookies_cmd::run(&path).await
        }
        Commands::Doctor => cli::doctor::run(&config).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "scout", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
