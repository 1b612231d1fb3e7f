use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use doc_cleaner::app::clean_use_case::CleanUseCase;
use doc_cleaner::config::Config;
use doc_cleaner::infra::http_client::ReqwestGateway;
use doc_cleaner::normalize::{clean_batch, MissingIdPolicy};
use doc_cleaner::types::CanonicalRecord;
use doc_cleaner::{logging, metrics, server};

#[derive(Parser)]
#[command(name = "doc_cleaner")]
#[command(about = "Fetch, normalize, deduplicate and submit document record batches")]
#[command(version = "0.1.0")]
struct Cli {
    /// Optional TOML config file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Port to listen on (defaults to PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the raw payload of a batch
    Raw {
        #[arg(long)]
        batch: u32,
    },
    /// Print the cleaned records of a batch
    Clean {
        #[arg(long)]
        batch: u32,
    },
    /// Clean a saved raw payload without touching the network
    CleanFile {
        /// JSON file holding a raw batch payload (`{"records": [...]}`)
        #[arg(long)]
        input: PathBuf,
        /// Keep every record without a doc_id instead of collapsing them
        #[arg(long)]
        keep_missing_ids: bool,
    },
    /// Submit a cleaned batch
    Submit {
        #[arg(long)]
        batch: u32,
        /// JSON array of cleaned records to send instead of cleaning the batch
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("'{}' is not valid JSON", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_use_case(config: &Config) -> Result<Arc<CleanUseCase>> {
    let gateway = Arc::new(ReqwestGateway::new(config)?);
    Ok(Arc::new(CleanUseCase::new(
        gateway.clone(),
        gateway,
        config.candidate_name.clone(),
        config.dedupe_missing_ids,
    )))
}

/// Config, logging and the wired use case for commands that talk to the API
fn connect(
    config_path: Option<&Path>,
) -> Result<(Config, Arc<CleanUseCase>, Option<WorkerGuard>)> {
    let config = Config::load(config_path).context("invalid configuration")?;
    let guard = logging::init_logging(config.debug);
    let use_case = build_use_case(&config)?;
    Ok((config, use_case, guard))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::CleanFile { input, keep_missing_ids } => {
            let _guard = logging::init_logging(false);
            let policy = if keep_missing_ids {
                MissingIdPolicy::KeepAll
            } else {
                MissingIdPolicy::Collapse
            };
            let payload = read_json(&input)?;
            let (cleaned, report) = clean_batch(&payload, policy);
            info!(?report, "Cleaned '{}'", input.display());
            print_json(&cleaned)?;
        }
        Commands::Serve { port } => {
            let (config, use_case, _guard) = connect(config_path)?;
            metrics::init(config.server.metrics_port);
            let port = port.unwrap_or(config.server.port);
            if let Err(e) = server::start_server(use_case, port).await {
                error!("Server failed: {}", e);
                return Err(e);
            }
        }
        Commands::Raw { batch } => {
            let (_config, use_case, _guard) = connect(config_path)?;
            match use_case.raw_batch(batch).await {
                Some(payload) => print_json(&payload)?,
                None => bail!("Failed to fetch data for batch {}", batch),
            }
        }
        Commands::Clean { batch } => {
            let (_config, use_case, _guard) = connect(config_path)?;
            match use_case.cleaned_batch(batch).await {
                Some((cleaned, _report)) => print_json(&cleaned)?,
                None => bail!("Failed to fetch data for batch {}", batch),
            }
        }
        Commands::Submit { batch, input } => {
            let (_config, use_case, _guard) = connect(config_path)?;
            let cleaned_items: Vec<CanonicalRecord> = match input {
                Some(path) => serde_json::from_value(read_json(&path)?).with_context(|| {
                    format!("'{}' is not a list of cleaned records", path.display())
                })?,
                None => match use_case.cleaned_batch(batch).await {
                    Some((cleaned, _report)) => cleaned,
                    None => bail!("Failed to fetch data for batch {}", batch),
                },
            };
            let reply = use_case.submit_cleaned(batch, &cleaned_items).await?;
            info!("Submission returned status {}", reply.status);
            print_json(&reply.body)?;
        }
    }
    Ok(())
}
