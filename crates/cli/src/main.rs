mod logging;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use orderpix_core::checkpoint::format_checkpoint;
use orderpix_core::{load_config, run_fulfillment, validate_config, Config, HttpFetcher};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    // Determine config path
    let config_path = std::env::var("ORDERPIX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    let loaded = load(&config_path);

    // Log sinks come from the config; fall back to defaults so a bad config
    // is still reported
    let logging_config = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    let guard = match logging::init_logging(&logging_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            None
        }
    };

    let result = match loaded {
        Ok(config) => run(&config_path, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        // exit() skips destructors; flush the log file first
        drop(guard);
        std::process::exit(1);
    }
}

fn load(config_path: &Path) -> Result<Config> {
    let config = load_config(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

async fn run(config_path: &Path, config: Config) -> Result<()> {
    info!(version = VERSION, config = %config_path.display(), "Starting orderpix");
    info!("Inventory: {:?}", config.paths.inventory);
    info!("Orders: {:?}", config.paths.orders);
    info!("Downloads: {:?}", config.paths.downloads);

    let fetcher = HttpFetcher::new(config.fetch.clone()).context("Failed to create HTTP client")?;

    let report = run_fulfillment(&config, fetcher)
        .await
        .context("Fulfillment run failed")?;

    let summary = &report.summary;
    info!(
        orders_seen = summary.orders_seen,
        processed = summary.processed,
        skipped_stale = summary.skipped_stale,
        skipped_unparseable = summary.skipped_unparseable,
        quarantined = summary.quarantined,
        "Orders handled"
    );
    info!(
        images_acquired = summary.images_acquired,
        failed_references = summary.failed_references,
        "Total images acquired: {}",
        summary.images_acquired
    );

    if let Some(checkpoint) = summary.checkpoint {
        info!("Checkpoint: {}", format_checkpoint(checkpoint));
    }

    if report.report_lines > 0 || report.sweep.failures > 0 {
        warn!(
            report_lines = report.report_lines,
            relocated = report.sweep.relocated.len(),
            relocation_failures = report.sweep.failures,
            report = %config.paths.report_path().display(),
            "Run finished with failures"
        );
    } else {
        info!("Run finished cleanly");
    }

    Ok(())
}
