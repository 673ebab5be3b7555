//! Runtime configuration.
//!
//! Values resolve from CLI flags, then environment variables, then a `.env`
//! file in the working directory, then built-in defaults. CLI overrides are
//! applied by the caller on top of [`ScoutConfig::from_env`].

use crate::collector::CollectorSettings;
use crate::orchestrator::OrchestratorSettings;
use company_scout::extract::directory::DEFAULT_DIRECTORY_ORIGIN;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DIRECTORY_URL: &str = "https://www.ycombinator.com/companies?batch=Spring%202025";
const DEFAULT_NETWORK_URL: &str =
    "https://www.linkedin.com/search/results/companies/?keywords=%28YC%20S25%29";
const DEFAULT_NETWORK_NEXT_SELECTOR: &str = "button.artdeco-pagination__button--next";
const DEFAULT_COOKIE_FILE: &str = "linkedin_cookies.json";
const DEFAULT_PASS_INTERVAL_SECS: u64 = 30;
const DEFAULT_RETRY_BACKOFF_SECS: u64 = 3;
const DEFAULT_NAV_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_SETTLE_MS: u64 = 2_000;
const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub db_path: PathBuf,
    pub cookie_file: PathBuf,
    pub directory_url: String,
    pub directory_origin: String,
    pub network_url: String,
    pub network_next_selector: String,
    pub pass_interval: Duration,
    pub retry_backoff: Duration,
    pub nav_timeout_ms: u64,
    pub settle: Duration,
    pub max_consecutive_failures: u32,
    pub chromium_path: Option<PathBuf>,
    pub headless: bool,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cookie_file: PathBuf::from(DEFAULT_COOKIE_FILE),
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            directory_origin: DEFAULT_DIRECTORY_ORIGIN.to_string(),
            network_url: DEFAULT_NETWORK_URL.to_string(),
            network_next_selector: DEFAULT_NETWORK_NEXT_SELECTOR.to_string(),
            pass_interval: Duration::from_secs(DEFAULT_PASS_INTERVAL_SECS),
            retry_backoff: Duration::from_secs(DEFAULT_RETRY_BACKOFF_SECS),
            nav_timeout_ms: DEFAULT_NAV_TIMEOUT_MS,
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            chromium_path: None,
            headless: true,
        }
    }
}

impl ScoutConfig {
    /// Load `.env` (if present) and resolve from the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let number = |name: &str, default_value: u64| {
            string(name)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default_value)
        };

        Self {
            db_path: string("SCOUT_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            cookie_file: string("SCOUT_COOKIE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.cookie_file),
            directory_url: string("SCOUT_DIRECTORY_URL").unwrap_or(defaults.directory_url),
            directory_origin: string("SCOUT_DIRECTORY_ORIGIN")
                .unwrap_or(defaults.directory_origin),
            network_url: string("SCOUT_NETWORK_URL").unwrap_or(defaults.network_url),
            network_next_selector: string("SCOUT_NETWORK_NEXT_SELECTOR")
                .unwrap_or(defaults.network_next_selector),
            pass_interval: Duration::from_secs(number(
                "SCOUT_PASS_INTERVAL_SECS",
                DEFAULT_PASS_INTERVAL_SECS,
            )),
            retry_backoff: Duration::from_secs(number(
                "SCOUT_RETRY_BACKOFF_SECS",
                DEFAULT_RETRY_BACKOFF_SECS,
            )),
            nav_timeout_ms: number("SCOUT_NAV_TIMEOUT_MS", DEFAULT_NAV_TIMEOUT_MS).max(1_000),
            settle: Duration::from_millis(number("SCOUT_SETTLE_MS", DEFAULT_SETTLE_MS)),
            max_consecutive_failures: number(
                "SCOUT_MAX_CONSECUTIVE_FAILURES",
                DEFAULT_MAX_CONSECUTIVE_FAILURES as u64,
            )
            .clamp(1, u32::MAX as u64) as u32,
            chromium_path: string("SCOUT_CHROMIUM_PATH").map(PathBuf::from),
            headless: !string("SCOUT_HEADFUL").is_some_and(|v| is_truthy(&v)),
        }
    }

    pub fn collector_settings(&self) -> CollectorSettings {
        CollectorSettings {
            nav_timeout_ms: self.nav_timeout_ms,
            settle: self.settle,
        }
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            pass_interval: self.pass_interval,
            retry_backoff: self.retry_backoff,
            max_consecutive_failures: self.max_consecutive_failures,
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// `~/.company-scout/companies.db`, or the working directory without a home.
fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".company-scout")
        .join("companies.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ScoutConfig::from_lookup(|_| None);
        assert_eq!(config.pass_interval, Duration::from_secs(30));
        assert_eq!(config.retry_backoff, Duration::from_secs(3));
        assert_eq!(config.cookie_file, PathBuf::from("linkedin_cookies.json"));
        assert_eq!(config.directory_url, DEFAULT_DIRECTORY_URL);
        assert!(config.headless);
        assert!(config.db_path.ends_with(".company-scout/companies.db"));
    }

    #[test]
    fn environment_overrides() {
        let config = ScoutConfig::from_lookup(lookup(&[
            ("SCOUT_DB_PATH", "/tmp/scout.db"),
            ("SCOUT_PASS_INTERVAL_SECS", "45"),
            ("SCOUT_SETTLE_MS", "250"),
            ("SCOUT_MAX_CONSECUTIVE_FAILURES", "0"),
            ("SCOUT_HEADFUL", "true"),
            ("SCOUT_CHROMIUM_PATH", "/opt/chrome"),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/tmp/scout.db"));
        assert_eq!(config.pass_interval, Duration::from_secs(45));
        assert_eq!(config.settle, Duration::from_millis(250));
        assert_eq!(config.max_consecutive_failures, 1);
        assert!(!config.headless);
        assert_eq!(config.chromium_path, Some(PathBuf::from("/opt/chrome")));
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let config = ScoutConfig::from_lookup(lookup(&[
            ("SCOUT_RETRY_BACKOFF_SECS", "soon"),
            ("SCOUT_NAV_TIMEOUT_MS", "5"),
            ("SCOUT_DIRECTORY_URL", "   "),
        ]));
        assert_eq!(config.retry_backoff, Duration::from_secs(3));
        assert_eq!(config.nav_timeout_ms, 1_000);
        assert_eq!(config.directory_url, DEFAULT_DIRECTORY_URL);
    }
}
