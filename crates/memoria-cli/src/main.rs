//! Memoria CLI
//!
//! Command-line harness for the memoria associative memory core.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use memoria_core::model::FeedbackOutcome;
use memoria_core::store::file::FileStore;
use memoria_core::store::Store;
use memoria_core::{AssociateInput, Config, CoreError, FeedbackInput, MemoryCore, MemoryType, RecallInput, RememberInput};

/// Memoria — persistent associative memory core CLI
#[derive(Parser)]
#[command(name = "memoria")]
#[command(version = memoria_core::VERSION)]
#[command(about = "CLI for the memoria associative memory core")]
struct Cli {
    /// Override MEMORY_STATE_DIR for this invocation.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Admit a new item into the memory.
    Remember {
        text: String,
        #[arg(long, default_value = "fact")]
        item_type: String,
        #[arg(long)]
        tags: Option<String>,
        #[arg(long, default_value_t = 0.5)]
        importance: f64,
        #[arg(long, default_value = "30d")]
        ttl: String,
        #[arg(long)]
        scope: Option<String>,
    },

    /// Rank items by activation-backed relevance to a query.
    Recall {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        scope: Option<String>,
    },

    /// Insert or reinforce a directed edge between two items.
    Associate {
        from: String,
        to: String,
        relation: String,
        #[arg(long, default_value_t = 0.5)]
        weight: f64,
    },

    /// Apply a success/fail signal to an existing item.
    Feedback {
        id: String,
        #[arg(value_enum)]
        outcome: FeedbackArg,
    },

    /// Apply exponential energy decay across all items.
    Decay {
        #[arg(long)]
        half_life_days: Option<f64>,
    },

    /// Prune low-energy, rarely-accessed items.
    Consolidate,

    /// Print the cached (or freshly generated) manifest.
    Status,

    /// Alias for `status` that prints the rendered manifest text only.
    Describe,

    /// Force synchronous manifest regeneration.
    Refresh,
}

#[derive(Copy, Clone, clap::ValueEnum)]
enum FeedbackArg {
    Success,
    Fail,
}

impl From<FeedbackArg> for FeedbackOutcome {
    fn from(value: FeedbackArg) -> Self {
        match value {
            FeedbackArg::Success => FeedbackOutcome::Success,
            FeedbackArg::Fail => FeedbackOutcome::Fail,
        }
    }
}

fn parse_item_type(raw: &str) -> Result<MemoryType, String> {
    MemoryType::parse_name(raw).ok_or_else(|| format!("unknown item type '{raw}'"))
}

fn parse_tags(raw: Option<String>) -> Vec<String> {
    raw.map(|t| t.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// sysexits.h-style codes, per the documented CLI contract: 0 success,
/// 64 bad usage/input, 74 I/O error, 75 temporary/retryable failure
/// (store-unavailable-with-fallback only — nothing else here retries),
/// 1 everything else.
fn exit_code_for(err: &CoreError) -> u8 {
    match err {
        CoreError::InvalidInput(_) | CoreError::UnknownReference(_) | CoreError::ValidationRejected { .. } => 64,
        CoreError::StoreUnavailable(_) => 74,
        CoreError::Manifest(_) | CoreError::Internal(_) => 1,
    }
}

async fn build_core(state_dir: Option<PathBuf>) -> Result<MemoryCore, CoreError> {
    let mut config = Config::from_env();
    if let Some(dir) = state_dir {
        config.state_dir = dir;
    }

    #[cfg(feature = "graph-store")]
    if let Some(uri) = config.graph_store_uri.clone() {
        let store = memoria_core::store::graph_db::GraphDbStore::connect(&uri, &config.graph_store_user, &config.graph_store_password)
            .await
            .map_err(CoreError::StoreUnavailable)?;
        return MemoryCore::new(Arc::new(store) as Arc<dyn Store>, config).await;
    }

    let store = Arc::new(FileStore::new(&config.state_dir).await.map_err(CoreError::StoreUnavailable)?);
    MemoryCore::new(store as Arc<dyn Store>, config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::from(0),
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::from(exit_code_for(&err))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CoreError> {
    let core = build_core(cli.state_dir).await?;

    match cli.command {
        Commands::Remember {
            text,
            item_type,
            tags,
            importance,
            ttl,
            scope,
        } => {
            let item_type = parse_item_type(&item_type).map_err(CoreError::InvalidInput)?;
            let id = core
                .remember(RememberInput {
                    text,
                    item_type,
                    tags: parse_tags(tags),
                    importance,
                    ttl,
                    scope,
                })
                .await?;
            println!("{} {id}", "remembered".green().bold());
        }

        Commands::Recall { query, limit, scope } => {
            let hits = core.recall(RecallInput { query, limit, scope }).await?;
            if hits.is_empty() {
                println!("{}", "no matches".yellow());
            }
            for hit in hits {
                println!("{:<38} {:.4}", hit.id, hit.score);
            }
        }

        Commands::Associate { from, to, relation, weight } => {
            core.associate(AssociateInput { from, to, relation, weight }).await?;
            println!("{}", "associated".green().bold());
        }

        Commands::Feedback { id, outcome } => {
            core.feedback(FeedbackInput { id, outcome: outcome.into() }).await?;
            println!("{}", "feedback applied".green().bold());
        }

        Commands::Decay { half_life_days } => {
            let updated = core.decay(half_life_days).await?;
            println!("{} {updated}", "items decayed:".cyan());
        }

        Commands::Consolidate => {
            let pruned = core.consolidate().await?;
            println!("{} {pruned}", "items pruned:".cyan());
        }

        Commands::Status => {
            let manifest = core.status().await?;
            println!("{}", serde_json::to_string_pretty(&manifest).unwrap_or_default());
        }

        Commands::Refresh => {
            let manifest = core.refresh().await?;
            println!("{}", serde_json::to_string_pretty(&manifest).unwrap_or_default());
        }

        Commands::Describe => {
            println!("{}", core.describe().await?);
        }
    }

    Ok(())
}
