//! Order resolution engine implementation.
//!
//! Walks the order feed once, front to back, one order, one SKU and one image
//! at a time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::acquirer::{
    copy_local, fetch_and_name, reference_file_name, FetchError, FileNaming, ImageFetcher,
};
use crate::catalog::{CatalogError, Inventory, OrderRecord, SourceKind};
use crate::checkpoint::{format_checkpoint, CheckpointStore};
use crate::library::ReferenceLibrary;

use super::config::EngineConfig;
use super::context::RunContext;
use super::types::{AcquisitionOutcome, EngineError, OrderState, RunSummary, SkipReason, SkuResult};

/// Resolves orders into per-order image directories.
pub struct OrderEngine<F: ImageFetcher> {
    config: EngineConfig,
    fetcher: F,
    primary: ReferenceLibrary,
    secondary: ReferenceLibrary,
    checkpoint: Arc<dyn CheckpointStore>,
}

impl<F: ImageFetcher> OrderEngine<F> {
    pub fn new(config: EngineConfig, fetcher: F, checkpoint: Arc<dyn CheckpointStore>) -> Self {
        let primary = ReferenceLibrary::new(&config.primary_library);
        let secondary = ReferenceLibrary::new(&config.secondary_library);

        Self {
            config,
            fetcher,
            primary,
            secondary,
            checkpoint,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run one fulfillment pass over `orders`.
    ///
    /// The first `header_rows` rows are skipped. Orders not newer than the
    /// stored checkpoint are skipped. The checkpoint is written once at the
    /// end, also when the pass fails part way; the pass error is returned in
    /// preference to a checkpoint error.
    pub async fn run<I>(
        &self,
        inventory: &Inventory,
        orders: I,
        ctx: &mut RunContext,
    ) -> Result<RunSummary, EngineError>
    where
        I: IntoIterator<Item = Result<OrderRecord, CatalogError>>,
    {
        let last_run = self.checkpoint.read();
        let since = last_run
            .map(format_checkpoint)
            .unwrap_or_else(|| "none".to_string());
        info!(checkpoint = %since, fetcher = self.fetcher.name(), "Starting fulfillment pass");

        let mut summary = RunSummary::default();
        let pass = self
            .process_orders(inventory, orders, last_run, ctx, &mut summary)
            .await;
        let persisted = self.persist_checkpoint(ctx);

        pass?;
        persisted?;

        summary.checkpoint = ctx.checkpoint_candidate().max(last_run);
        Ok(summary)
    }

    async fn process_orders<I>(
        &self,
        inventory: &Inventory,
        orders: I,
        last_run: Option<NaiveDateTime>,
        ctx: &mut RunContext,
        summary: &mut RunSummary,
    ) -> Result<(), EngineError>
    where
        I: IntoIterator<Item = Result<OrderRecord, CatalogError>>,
    {
        for item in orders.into_iter().skip(self.config.header_rows) {
            let order = item?;

            let state = match self.admit(&order, last_run) {
                Err(reason) => OrderState::Skipped(reason),
                Ok((timestamp, order_id)) => {
                    let state = self.fulfill_order(inventory, &order, order_id, ctx).await?;
                    if state.advances_checkpoint() {
                        ctx.advance_checkpoint(timestamp);
                    }
                    state
                }
            };

            summary.record(&state);
        }

        Ok(())
    }

    fn persist_checkpoint(&self, ctx: &RunContext) -> Result<(), EngineError> {
        match ctx.checkpoint_candidate() {
            Some(timestamp) => {
                self.checkpoint.write(timestamp)?;
                info!(checkpoint = %format_checkpoint(timestamp), "Checkpoint advanced");
            }
            None => debug!("No new orders, checkpoint unchanged"),
        }
        Ok(())
    }

    /// Decide whether a row is processed, returning its timestamp and order id.
    fn admit<'o>(
        &self,
        order: &'o OrderRecord,
        last_run: Option<NaiveDateTime>,
    ) -> Result<(NaiveDateTime, &'o str), SkipReason> {
        let date = order.date.as_deref().map(str::trim).unwrap_or_default();
        if date.is_empty() {
            debug!(row = order.row, "Skipping row without date");
            return Err(SkipReason::Undated);
        }

        let time = order.time.as_deref().map(str::trim).unwrap_or_default();
        let Some(timestamp) = self.parse_timestamp(date, time) else {
            warn!(row = order.row, date, time, "Skipping order with unparseable timestamp");
            return Err(SkipReason::UnparseableTimestamp);
        };

        if last_run.is_some_and(|checkpoint| timestamp <= checkpoint) {
            debug!(row = order.row, %timestamp, "Skipping order already processed");
            return Err(SkipReason::Stale);
        }

        let order_id = order.order_id.as_deref().map(str::trim).unwrap_or_default();
        // A quarantined order directory must not shadow the report file
        if !is_valid_order_id(order_id) || order_id == self.config.report_file_name {
            warn!(row = order.row, order_id, "Skipping order with invalid order id");
            return Err(SkipReason::InvalidOrderId);
        }

        Ok((timestamp, order_id))
    }

    /// Parse `"{date},{time}"` with the primary format, then the fallback.
    pub fn parse_timestamp(&self, date: &str, time: &str) -> Option<NaiveDateTime> {
        let raw = format!("{},{}", date, time);

        [
            &self.config.timestamp_format,
            &self.config.fallback_timestamp_format,
        ]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
    }

    async fn fulfill_order(
        &self,
        inventory: &Inventory,
        order: &OrderRecord,
        order_id: &str,
        ctx: &mut RunContext,
    ) -> Result<OrderState, EngineError> {
        let skus = order.sku_tokens();
        if skus.is_empty() {
            error!(order_id, "Order has no SKU");
            create_dir(&self.config.quarantine_dir.join(order_id)).await?;
            ctx.record_message(format!("Order {} has no SKU", order_id));
            return Ok(OrderState::NoSku);
        }

        let mut created = Vec::new();
        let mut results = Vec::with_capacity(skus.len());
        for sku in skus {
            let result = self
                .resolve_sku(inventory, order_id, sku, &mut created, ctx)
                .await?;
            results.push(result);
        }

        if results.iter().any(|r| r.outcome.is_acquired()) {
            let images: usize = results.iter().map(|r| r.acquired).sum();
            info!(order_id, images, "Order fulfilled");
            Ok(OrderState::Fulfilled(results))
        } else {
            self.quarantine_order(order_id, &created, ctx).await?;
            Ok(OrderState::AllFailed(results))
        }
    }

    async fn resolve_sku(
        &self,
        inventory: &Inventory,
        order_id: &str,
        sku: &str,
        created: &mut Vec<PathBuf>,
        ctx: &mut RunContext,
    ) -> Result<SkuResult, EngineError> {
        let result = |outcome, acquired, failed| SkuResult {
            sku: sku.to_string(),
            outcome,
            acquired,
            failed,
        };

        let Some(record) = inventory.lookup(sku) else {
            warn!(order_id, sku, "SKU not found in inventory");
            return Ok(result(AcquisitionOutcome::NotInCatalog, 0, 0));
        };

        let refs: Vec<&str> = record
            .image_refs
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect();
        if refs.is_empty() {
            warn!(order_id, sku, "No image reference for SKU");
            ctx.record_message(format!("No image URL for SKU: {}, Folder: {}", sku, order_id));
            return Ok(result(AcquisitionOutcome::NoSourceUrl, 0, 0));
        }

        let dest_dir = self
            .order_dir(record.source_kind, order_id, created)
            .await?;

        let (acquired, failed) = match record.source_kind {
            SourceKind::LocalPrimary => {
                self.copy_from_library(&self.primary, &dest_dir, order_id, sku, &refs, ctx)
                    .await
            }
            SourceKind::LocalSecondary => {
                self.copy_from_library(&self.secondary, &dest_dir, order_id, sku, &refs, ctx)
                    .await
            }
            SourceKind::SingleRemote => {
                self.fetch_remote(&dest_dir, order_id, sku, &refs[..1], FileNaming::SingleRemote, ctx)
                    .await
            }
            SourceKind::MultiRemote => {
                let naming = FileNaming::OrderPrefixed(order_id);
                self.fetch_remote(&dest_dir, order_id, sku, &refs, naming, ctx)
                    .await
            }
        };

        let outcome = if acquired > 0 {
            AcquisitionOutcome::Acquired
        } else if record.source_kind.is_local() {
            ctx.record_message(format!(
                "No library image for SKU: {}, Folder: {}",
                sku, order_id
            ));
            AcquisitionOutcome::NotInLibrary
        } else {
            AcquisitionOutcome::FetchFailed
        };

        debug!(order_id, sku, kind = %record.source_kind, ?outcome, acquired, failed, "SKU resolved");
        Ok(result(outcome, acquired, failed))
    }

    /// Copy every located reference. Returns `(acquired, failed)`.
    async fn copy_from_library(
        &self,
        library: &ReferenceLibrary,
        dest_dir: &Path,
        order_id: &str,
        sku: &str,
        refs: &[&str],
        ctx: &mut RunContext,
    ) -> (usize, usize) {
        let mut acquired = 0;
        let mut failed = 0;

        for reference in refs {
            let Some(name) = reference_file_name(reference) else {
                debug!(order_id, sku, reference, "Reference has no file name");
                failed += 1;
                continue;
            };

            let Some(found) = library.locate(&name).await else {
                debug!(
                    order_id,
                    sku,
                    name = %name,
                    library = %library.root().display(),
                    "Image not in library"
                );
                failed += 1;
                continue;
            };

            match copy_local(dest_dir, &found, FileNaming::OrderPrefixed(order_id)).await {
                Ok(placed) => {
                    acquired += 1;
                    info!(order_id, sku, path = %placed.display(), "Image copied from library");
                }
                Err(e) => {
                    failed += 1;
                    warn!(order_id, sku, error = %e, "Library copy failed");
                    ctx.record_message(format!(
                        "Failed to copy image for SKU: {}, Folder: {}: {}",
                        sku, order_id, e
                    ));
                }
            }
        }

        (acquired, failed)
    }

    /// Fetch every URL in turn. Returns `(acquired, failed)`.
    async fn fetch_remote(
        &self,
        dest_dir: &Path,
        order_id: &str,
        sku: &str,
        urls: &[&str],
        naming: FileNaming<'_>,
        ctx: &mut RunContext,
    ) -> (usize, usize) {
        let mut acquired = 0;
        let mut failed = 0;

        for url in urls {
            match fetch_and_name(&self.fetcher, dest_dir, url, naming).await {
                Ok(placed) => {
                    acquired += 1;
                    info!(order_id, sku, url, path = %placed.display(), "Image downloaded");
                }
                Err(e) => {
                    failed += 1;
                    record_fetch_failure(dest_dir, order_id, sku, url, &e, ctx);
                }
            }
        }

        (acquired, failed)
    }

    /// Output directory for an order of `kind`, created on first use.
    async fn order_dir(
        &self,
        kind: SourceKind,
        order_id: &str,
        created: &mut Vec<PathBuf>,
    ) -> Result<PathBuf, EngineError> {
        let dir = self
            .config
            .downloads_dir
            .join(kind.dir_name())
            .join(order_id);

        if !created.contains(&dir) {
            create_dir(&dir).await?;
            created.push(dir.clone());
        }

        Ok(dir)
    }

    /// Undo the order's output directories and mark it in quarantine.
    async fn quarantine_order(
        &self,
        order_id: &str,
        created: &[PathBuf],
        ctx: &mut RunContext,
    ) -> Result<(), EngineError> {
        for dir in created {
            // Only empty directories go; anything left behind stays visible
            if let Err(e) = fs::remove_dir(dir).await {
                warn!(order_id, dir = %dir.display(), error = %e, "Could not remove order directory");
            }
        }

        create_dir(&self.config.quarantine_dir.join(order_id)).await?;
        error!(order_id, "No image acquired for order");
        ctx.record_message(format!("No image acquired for order: {}", order_id));
        Ok(())
    }
}

/// Refused requests go to the report as messages. Anything else leaves the
/// destination in doubt, so the URL is listed and the directory queued.
fn record_fetch_failure(
    dest_dir: &Path,
    order_id: &str,
    sku: &str,
    url: &str,
    err: &FetchError,
    ctx: &mut RunContext,
) {
    if err.is_status() {
        warn!(order_id, sku, url, error = %err, "Image download refused");
        ctx.record_message(format!(
            "Failed to download image for SKU: {}, Folder: {}: {}",
            sku, order_id, err
        ));
    } else {
        error!(order_id, sku, url, error = %err, "Image download failed");
        ctx.record_failed_url(url, dest_dir);
        ctx.queue_failed_dir(dest_dir);
    }
}

/// An order id names a directory, so it must be a single path component.
fn is_valid_order_id(order_id: &str) -> bool {
    !order_id.is_empty()
        && order_id != "."
        && order_id != ".."
        && !order_id.contains(['/', '\\'])
}

async fn create_dir(dir: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| EngineError::Io {
            path: dir.to_path_buf(),
            source: e,
        })
}
