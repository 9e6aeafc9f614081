//! CLI argument parsing.
//!
//! Flags override every other configuration source.

use clap::{Parser, Subcommand};

/// prompt-vault
///
/// Store prompts with generated responses and search them by similarity.
#[derive(Parser, Debug)]
#[command(name = "prompt-vault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/prompt-vault/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override record store path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Client id used for rate limiting.
    ///
    /// Limiter state lives in this process only, so the limit applies to the
    /// requests of a single invocation and resets on the next run.
    #[arg(long, global = true, default_value = "cli")]
    pub client_id: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a prompt with a generated response
    Ingest {
        /// Prompt text
        text: String,
    },

    /// Find stored prompts similar to a query
    Search {
        /// Query text
        query: String,

        /// Number of results
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },

    /// Show component health and index statistics
    Stats,

    /// Force a durable snapshot of the vector index
    Save,
}
