//! Environment readiness check.

use crate::config::ScoutConfig;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;
use company_scout::{describe_load_error, try_load_cookies, SqliteCompanyStore};

/// Check Chromium availability, the record store, and the cookie file.
pub async fn run(config: &ScoutConfig) -> Result<()> {
    println!("Company Scout Doctor");
    println!("====================");
    println!();

    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    // Chromium
    let chromium = config
        .chromium_path
        .clone()
        .filter(|p| p.exists())
        .or_else(find_chromium);
    match &chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!("[!!] Chromium NOT found. Install Chrome or set SCOUT_CHROMIUM_PATH."),
    }

    // Record store
    let store_ok = match SqliteCompanyStore::open(&config.db_path) {
        Ok(store) => match store.count() {
            Ok(n) => {
                println!("[OK] Database {} ({n} companies)", config.db_path.display());
                true
            }
            Err(e) => {
                println!("[!!] Database {} unreadable: {e}", config.db_path.display());
                false
            }
        },
        Err(e) => {
            println!("[!!] Cannot open database {}: {e}", config.db_path.display());
            false
        }
    };

    // Cookies are optional; without them the network source runs anonymously.
    match try_load_cookies(&config.cookie_file) {
        Ok(cookies) if cookies.is_empty() => {
            println!("[??] Cookie file {} is empty", config.cookie_file.display())
        }
        Ok(cookies) => println!(
            "[OK] {} cookie(s) in {}",
            cookies.len(),
            config.cookie_file.display()
        ),
        Err(e) => println!("[??] {}", describe_load_error(&config.cookie_file, &e)),
    }

    println!();
    if chromium.is_some() && store_ok {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}
