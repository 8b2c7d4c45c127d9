mod cli;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use trinket_manifest::{run_update, HttpFetcher, UpdateOutcome, UpdateSummary};

use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Human readable log lines on stdout; `RUST_LOG` overrides the default level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.into_config()?;
    info!(
        "Updating {:?} from {}@{}",
        config.manifest_path, config.source.repo, config.source.reference
    );

    let fetcher = HttpFetcher::new(&config).context("failed to set up HTTP client")?;
    let summary = run_update(&config, &fetcher)
        .await
        .with_context(|| format!("failed to update {}", config.manifest_path.display()))?;

    log_summary(&summary);
    Ok(())
}

fn log_summary(summary: &UpdateSummary) {
    let report = &summary.report;
    info!(
        "Archive {} ({} bytes): {} folders, {} added, {} updated, {} up-to-date",
        summary.digest,
        summary.archive_size,
        summary.packages.len(),
        report.added.len(),
        report.updated.len(),
        report.up_to_date.len()
    );
    if !report.added.is_empty() {
        info!("Added: {}", report.added.join(", "));
    }
    if summary.outcome == UpdateOutcome::DryRun {
        info!("Dry run, manifest left untouched");
    }
}
