//! prompt-vault
//!
//! Stores prompts with generated responses and finds similar ones later.
//!
//! # Usage
//!
//! ```bash
//! prompt-vault ingest "How do lifetimes work?"
//! prompt-vault search "lifetimes" -k 3
//! prompt-vault stats
//! prompt-vault save
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/prompt-vault/config.toml)
//! 3. `--config` file
//! 4. Environment variables (VAULT_*)
//! 5. CLI flags
//!
//! # Rate limiting
//!
//! Requests are admitted per `--client-id` by an in-memory sliding window.
//! The window is not persisted, so each invocation starts with an empty one.

use std::process::ExitCode;

use clap::Parser;

use vault_daemon::{exit_code, run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
