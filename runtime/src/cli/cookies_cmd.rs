//! `scout cookies` — validate a cookie export file.

use crate::cli::output;
use anyhow::Result;
use company_scout::{describe_load_error, try_load_cookies};
use std::path::Path;

/// Parse the cookie file and print what would be attached to the browser.
pub async fn run(path: &Path) -> Result<()> {
    let cookies = match try_load_cookies(path) {
        Ok(cookies) => cookies,
        Err(e) => anyhow::bail!("{}", describe_load_error(path, &e)),
    };

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "count": cookies.len(),
            "cookies": cookies,
        }));
        return Ok(());
    }

    if output::is_quiet() {
        return Ok(());
    }

    println!("  {} cookie(s) in {}\n", cookies.len(), path.display());
    for cookie in &cookies {
        let expires = cookie
            .expires
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "session".to_string());
        println!(
            "    {:<24} {:<28} {:<8} {:<6} {}",
            output::truncate(&cookie.name, 24),
            output::truncate(&cookie.domain, 28),
            cookie.same_site.as_str(),
            if cookie.secure { "secure" } else { "" },
            expires
        );
    }
    Ok(())
}
