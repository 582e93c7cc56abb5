//! safescan - headless driver for the product-safety lookup core
//!
//! Runs one scan session (label image or barcode) to its terminal state and
//! prints the merged result as JSON, or fetches the review-sentiment
//! summary. Mirrors what the interactive UI does, without the markup.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use safescan::error::AcquisitionError;
use safescan::events::ScanEvent;
use safescan::sentiment::SummaryState;
use safescan::{BackendConfig, EventBus, ScanOrchestrator, ScanStatus, SentimentFetcher};
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "safescan", about = "Product-safety lookup", version)]
struct Cli {
    /// Backend base URL (overrides env var and config file)
    #[arg(long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a photographed product label
    Scan {
        /// Path to the label image (PNG/JPEG)
        image: PathBuf,
    },
    /// Look a product up by barcode
    Lookup {
        /// Barcode identifier, e.g. 4005900001504
        barcode: String,
    },
    /// Show the review sentiment summary
    Sentiment,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = BackendConfig::resolve(cli.backend.as_deref());
    info!(backend = %config.base_url, "Using backend");

    match cli.command {
        Command::Scan { image } => {
            let payload = std::fs::read(&image)
                .with_context(|| format!("failed to read image {}", image.display()))?;
            if payload.is_empty() {
                bail!("image file {} is empty", image.display());
            }
            let orchestrator = ScanOrchestrator::with_backend(&config, EventBus::new(64));
            let mut rx = orchestrator.subscribe();
            let session_id = orchestrator.start_image_session(payload).await;
            await_terminal(&mut rx, session_id).await?;
            render_session(&orchestrator).await
        }
        Command::Lookup { barcode } => {
            if barcode.trim().is_empty() {
                bail!("barcode must not be empty");
            }
            let orchestrator = ScanOrchestrator::with_backend(&config, EventBus::new(64));
            let mut rx = orchestrator.subscribe();
            let session_id = orchestrator.start_barcode_session(barcode.trim()).await;
            await_terminal(&mut rx, session_id).await?;
            render_session(&orchestrator).await
        }
        Command::Sentiment => {
            let fetcher = SentimentFetcher::with_backend(&config, EventBus::new(8));
            fetcher.refresh().await;
            match fetcher.state().await {
                SummaryState::Loaded(summary) => {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                    Ok(())
                }
                SummaryState::Failed(error) => bail!("failed to load sentiment data: {}", error),
                SummaryState::Loading => bail!("sentiment fetch did not settle"),
            }
        }
    }
}

/// Wait for the session's terminal event
async fn await_terminal(
    rx: &mut broadcast::Receiver<ScanEvent>,
    session_id: Uuid,
) -> Result<()> {
    loop {
        match rx.recv().await {
            Ok(ScanEvent::SessionCompleted { session_id: id, .. })
            | Ok(ScanEvent::SessionFailed { session_id: id, .. })
                if id == session_id =>
            {
                return Ok(());
            }
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => {
                bail!("event stream closed before the session finished")
            }
        }
    }
}

/// Print the terminal session state
async fn render_session(orchestrator: &ScanOrchestrator) -> Result<()> {
    let session = orchestrator
        .current_session()
        .await
        .context("no session state available")?;

    match session.status {
        ScanStatus::Complete => {
            if let Some(warning) = &session.scoring_warning {
                eprintln!("note: ingredients found, safety data unavailable ({})", warning);
            }
            let result = session.result.context("complete session without result")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        ScanStatus::Failed => match session.error {
            Some(AcquisitionError::NotFound(barcode)) => bail!(
                "product {} not found in the catalog; try scanning the label image instead",
                barcode
            ),
            Some(error) => bail!("scan failed: {}", error),
            None => bail!("scan failed"),
        },
        other => bail!("session ended in unexpected state {:?}", other),
    }
}
