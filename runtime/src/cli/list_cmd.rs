//! `scout list` — print the stored company table.

use crate::cli::output;
use crate::config::ScoutConfig;
use anyhow::{Context, Result};
use company_scout::{Company, SqliteCompanyStore};

/// List stored companies, newest first.
pub async fn run(config: &ScoutConfig, limit: Option<usize>) -> Result<()> {
    let store = SqliteCompanyStore::open(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;
    let companies = store.list(limit)?;
    let total = store.count()?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "total": total,
            "companies": companies,
        }));
        return Ok(());
    }

    if companies.is_empty() {
        if !output::is_quiet() {
            println!("  No companies stored yet. Run `scout run` to start collecting.");
        }
        return Ok(());
    }

    println!("  Companies ({} of {total}):\n", companies.len());
    for company in &companies {
        println!("{}", format_row(company));
    }
    Ok(())
}

fn format_row(company: &Company) -> String {
    format!(
        "    {:<28}  {:<24}  {:<44}  {}  {}",
        output::truncate(&company.name, 28),
        output::truncate(&company.location, 24),
        output::truncate(&company.description, 44),
        company.created_at.format("%Y-%m-%d %H:%M"),
        company.link
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn row_contains_fields() {
        let company = Company {
            id: Default::default(),
            name: "Acme".into(),
            location: "San Francisco, CA".into(),
            description: "Rockets".into(),
            link: "https://www.ycombinator.com/companies/acme".into(),
            created_at: chrono::Utc.with_ymd_and_hms(2025, 5, 1, 12, 30, 0).unwrap(),
            updated_at: None,
        };
        let row = format_row(&company);
        assert!(row.contains("Acme"));
        assert!(row.contains("San Francisco, CA"));
        assert!(row.contains("2025-05-01 12:30"));
        assert!(row.ends_with("https://www.ycombinator.com/companies/acme"));
    }
}
