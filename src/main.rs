mod availability;
mod error;
mod export;
mod models;
mod orchestrator;
mod prompt;

use anyhow::Context;
use availability::types::HOTEL_ID;
use availability::AvailabilityClient;
use chrono::Local;
use error::RunError;
use orchestrator::{Notice, Orchestrator, RunConfig};
use prompt::Prompt;
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🏨 Hotel Availability Checker");
    info!("Hotel ID: {}", HOTEL_ID);

    let mut prompt = Prompt::new(tokio::io::stdin(), tokio::io::stdout());
    let credential = prompt.read_credential().await?;
    let start_date = prompt.read_start_date(Local::now().date_naive()).await?;

    let client = AvailabilityClient::new()?;
    let mut orchestrator = Orchestrator::new(client);
    let config = RunConfig::new(credential, start_date);

    let outcome = match orchestrator.run(&config).await {
        Ok(outcome) => outcome,
        Err(RunError::MissingCredential) => {
            for notice in orchestrator.notices() {
                warn!("{}", notice);
            }
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if !outcome.failures.is_empty() {
        warn!(
            "{} of {} dates could not be checked and are missing from the results",
            outcome.failures.len(),
            config.search.horizon_days
        );
    }

    for notice in &outcome.notices {
        if matches!(notice, Notice::Success { .. } | Notice::NoResults) {
            info!("{}", notice);
        }
    }

    if let Some(artifact) = outcome.artifact {
        tokio::fs::write(artifact.file_name, &artifact.bytes)
            .await
            .with_context(|| format!("Failed to write {}", artifact.file_name))?;
        info!(
            "💾 Saved {} offers to {} ({})",
            outcome.report.len(),
            artifact.file_name,
            artifact.mime_type
        );
    }

    Ok(())
}
