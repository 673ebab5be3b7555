//! Shared output helpers for CLI subcommands.
//!
//! Global flags are published through environment variables by `main` so
//! every subcommand can check them without threading arguments around.

/// Whether `--json` was passed.
pub fn is_json() -> bool {
    flag("SCOUT_JSON")
}

/// Whether `--quiet` was passed.
pub fn is_quiet() -> bool {
    flag("SCOUT_QUIET")
}

/// Print a JSON value on stdout, pretty-printed.
pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("  Error: failed to encode JSON output: {e}"),
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn flag(name: &str) -> bool {
    std::env::var(name).map(|v| v == "1").unwrap_or(false)
}
