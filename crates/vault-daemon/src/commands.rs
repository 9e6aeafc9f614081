//! Command implementations.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use vault_service::{HealthReport, ServiceError, VaultContext};
use vault_types::{PromptRecord, Settings};
use vault_vector::IndexStats;

use crate::cli::{Cli, Commands};

/// Load layered settings and apply CLI overrides (highest precedence).
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(db_path) = &cli.db_path {
        settings.db_path = db_path.clone();
    }
    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }
    Ok(settings)
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Exit status for a failed command: 2 for bad input, 1 otherwise.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ServiceError>() {
        Some(e) if e.is_client_error() => 2,
        _ => 1,
    }
}

/// Parse-independent entry point used by `main`.
pub async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;
    init_logging(&settings.log_level)?;

    let context = open_context(settings).await?;
    let outcome = dispatch(&context, &cli.client_id, cli.command).await;
    close_context(context).await?;

    print_json(&outcome?)
}

/// Build every component off the async workers; the managed index backend
/// connects over blocking HTTP.
pub async fn open_context(settings: Settings) -> Result<VaultContext> {
    tokio::task::spawn_blocking(move || VaultContext::from_settings(&settings))
        .await
        .context("Context setup task failed")?
        .context("Failed to initialize prompt vault")
}

pub async fn close_context(context: VaultContext) -> Result<()> {
    tokio::task::spawn_blocking(move || context.shutdown())
        .await
        .context("Shutdown task failed")?
        .context("Failed to save vector index")
}

/// Result of one command, printed as JSON.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Record(PromptRecord),
    Records(Vec<PromptRecord>),
    Stats {
        index: IndexStatsView,
        health: HealthReport,
    },
    Saved {
        saved: bool,
        total_vectors: usize,
    },
}

#[derive(Debug, Serialize)]
pub struct IndexStatsView {
    pub backend: &'static str,
    pub total_vectors: usize,
    pub dimension: usize,
    pub pending_unsaved_count: usize,
}

impl IndexStatsView {
    fn new(backend: &'static str, stats: IndexStats) -> Self {
        Self {
            backend,
            total_vectors: stats.total_vectors,
            dimension: stats.dimension,
            pending_unsaved_count: stats.pending_unsaved_count,
        }
    }
}

pub async fn dispatch(
    context: &VaultContext,
    client_id: &str,
    command: Commands,
) -> Result<CommandOutput> {
    match command {
        Commands::Ingest { text } => {
            admit(context, client_id)?;
            let record = context.ingest().execute(&text).await?;
            info!(id = %record.id, "Stored prompt");
            Ok(CommandOutput::Record(record))
        }
        Commands::Search { query, k } => {
            admit(context, client_id)?;
            let records = context.search().execute(&query, k).await?;
            Ok(CommandOutput::Records(records))
        }
        Commands::Stats => handle_stats(context).await,
        Commands::Save => handle_save(context).await,
    }
}

/// Gate a request on the context's limiter, which only sees this process.
fn admit(context: &VaultContext, client_id: &str) -> Result<()> {
    if !context.admit(client_id) {
        let stats = context.rate_limiter().stats(client_id);
        warn!(
            client_id = client_id,
            current_requests = stats.current_requests,
            "Request rejected by rate limiter"
        );
        bail!("Rate limit exceeded for client {client_id}");
    }
    Ok(())
}

async fn handle_stats(context: &VaultContext) -> Result<CommandOutput> {
    let index = std::sync::Arc::clone(context.index());
    let stats = tokio::task::spawn_blocking(move || index.stats())
        .await
        .context("Stats task failed")?
        .context("Failed to read index stats")?;

    Ok(CommandOutput::Stats {
        index: IndexStatsView::new(context.index().backend(), stats),
        health: context.health(),
    })
}

async fn handle_save(context: &VaultContext) -> Result<CommandOutput> {
    let index = std::sync::Arc::clone(context.index());
    let stats = tokio::task::spawn_blocking(move || {
        index.save()?;
        index.stats()
    })
    .await
    .context("Save task failed")?
    .context("Failed to save vector index")?;

    info!(total_vectors = stats.total_vectors, "Vector index saved");
    Ok(CommandOutput::Saved {
        saved: true,
        total_vectors: stats.total_vectors,
    })
}

fn print_json(output: &CommandOutput) -> Result<()> {
    let json = serde_json::to_string_pretty(output).context("Failed to render output")?;
    println!("{json}");
    Ok(())
}
