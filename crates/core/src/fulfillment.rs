//! One complete fulfillment run: load, resolve, sweep.

use std::sync::Arc;

use tracing::{info, warn};

use crate::acquirer::ImageFetcher;
use crate::catalog::{Inventory, OrderRows};
use crate::checkpoint::FileCheckpointStore;
use crate::config::Config;
use crate::engine::{EngineConfig, EngineError, OrderEngine, RunContext, RunSummary};
use crate::quarantine::{QuarantineManager, SweepReport};

/// What a run did.
#[derive(Debug, Clone, Default)]
pub struct FulfillmentReport {
    pub summary: RunSummary,
    pub sweep: SweepReport,
    /// Lines written to the failure report.
    pub report_lines: usize,
}

/// Run the engine over the configured order feed, then sweep quarantine.
///
/// The inventory is loaded completely before the first order is read; a
/// missing inventory aborts the run without touching the checkpoint.
pub async fn run_fulfillment<F: ImageFetcher>(
    config: &Config,
    fetcher: F,
) -> Result<FulfillmentReport, EngineError> {
    let inventory = Inventory::load(&config.paths.inventory)?;
    info!(
        path = %config.paths.inventory.display(),
        entries = inventory.len(),
        "Inventory loaded"
    );
    for (sku, count) in inventory.duplicate_skus() {
        warn!(sku, count, "SKU listed more than once, using the first entry");
    }

    let orders = OrderRows::open(&config.paths.orders)?;
    let checkpoint = Arc::new(FileCheckpointStore::new(&config.paths.checkpoint));
    let engine = OrderEngine::new(EngineConfig::from(config), fetcher, checkpoint);

    let mut ctx = RunContext::new();
    let summary = engine.run(&inventory, orders, &mut ctx).await?;

    let sweep = QuarantineManager::from_paths(&config.paths)
        .sweep(&ctx)
        .await?;

    Ok(FulfillmentReport {
        summary,
        sweep,
        report_lines: ctx.failed_urls().len() + ctx.messages().len(),
    })
}
