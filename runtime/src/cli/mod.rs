//! CLI subcommand implementations for the `scout` binary.

pub mod cookies_cmd;
pub mod doctor;
pub mod list_cmd;
pub mod output;
pub mod run_cmd;
