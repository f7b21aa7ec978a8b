//! Types for the order resolution engine.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a fulfillment run.
///
/// Per-order problems never surface here; they are logged and recorded in
/// the [`RunContext`](super::RunContext) instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The inventory or order feed could not be read.
    #[error("catalog error: {0}")]
    Catalog(#[from] crate::catalog::CatalogError),

    /// An output directory could not be created.
    #[error("Failed to create directory {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The checkpoint could not be persisted.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] crate::checkpoint::CheckpointError),

    /// The quarantine area or the failure report could not be written.
    #[error("quarantine error: {0}")]
    Quarantine(#[from] crate::quarantine::QuarantineError),
}

/// Result of resolving one SKU of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionOutcome {
    /// At least one image was placed in the order directory.
    Acquired,
    /// The SKU is not in the inventory.
    NotInCatalog,
    /// The inventory entry lists no image reference.
    NoSourceUrl,
    /// No reference of a local entry could be copied from its library.
    NotInLibrary,
    /// Every remote fetch failed.
    FetchFailed,
}

impl AcquisitionOutcome {
    pub fn is_acquired(&self) -> bool {
        matches!(self, Self::Acquired)
    }
}

/// Per-SKU result with image counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuResult {
    pub sku: String,
    pub outcome: AcquisitionOutcome,
    /// Images placed for this SKU.
    pub acquired: usize,
    /// References that were attempted and failed.
    pub failed: usize,
}

/// Why a row was passed over without being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Empty or missing date field.
    Undated,
    /// Neither timestamp format matched.
    UnparseableTimestamp,
    /// Not newer than the checkpoint.
    Stale,
    /// Empty order id, or one that cannot name a directory.
    InvalidOrderId,
}

/// Terminal state of one order row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderState {
    Skipped(SkipReason),
    /// The order lists no SKU; it was quarantined.
    NoSku,
    /// At least one SKU was acquired.
    Fulfilled(Vec<SkuResult>),
    /// No SKU was acquired; the order was quarantined.
    AllFailed(Vec<SkuResult>),
}

impl OrderState {
    /// Whether this state moves the checkpoint candidate.
    pub fn advances_checkpoint(&self) -> bool {
        !matches!(self, Self::Skipped(_))
    }

    pub fn is_quarantined(&self) -> bool {
        matches!(self, Self::NoSku | Self::AllFailed(_))
    }

    pub fn sku_results(&self) -> &[SkuResult] {
        match self {
            Self::Fulfilled(results) | Self::AllFailed(results) => results,
            _ => &[],
        }
    }
}

/// Counters for one fulfillment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Rows read after the banner.
    pub orders_seen: usize,
    /// Orders that reached a non-skip terminal state.
    pub processed: usize,
    pub skipped_stale: usize,
    /// Rows skipped for an unparseable timestamp or an invalid order id.
    pub skipped_unparseable: usize,
    /// Orders routed to the quarantine area by the engine.
    pub quarantined: usize,
    pub images_acquired: usize,
    pub failed_references: usize,
    /// Checkpoint in effect after the pass.
    pub checkpoint: Option<NaiveDateTime>,
}

impl RunSummary {
    /// Fold one order's terminal state into the counters.
    pub fn record(&mut self, state: &OrderState) {
        self.orders_seen += 1;

        match state {
            OrderState::Skipped(SkipReason::Undated) => {}
            OrderState::Skipped(SkipReason::Stale) => self.skipped_stale += 1,
            OrderState::Skipped(_) => self.skipped_unparseable += 1,
            _ => self.processed += 1,
        }

        if state.is_quarantined() {
            self.quarantined += 1;
        }

        for result in state.sku_results() {
            self.images_acquired += result.acquired;
            self.failed_references += result.failed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sku(outcome: AcquisitionOutcome, acquired: usize, failed: usize) -> SkuResult {
        SkuResult {
            sku: "S1".to_string(),
            outcome,
            acquired,
            failed,
        }
    }

    #[test]
    fn test_skips_do_not_advance_checkpoint() {
        assert!(!OrderState::Skipped(SkipReason::Stale).advances_checkpoint());
        assert!(!OrderState::Skipped(SkipReason::Undated).advances_checkpoint());
        assert!(OrderState::NoSku.advances_checkpoint());
        assert!(OrderState::AllFailed(vec![]).advances_checkpoint());
        assert!(OrderState::Fulfilled(vec![]).advances_checkpoint());
    }

    #[test]
    fn test_summary_record() {
        let mut summary = RunSummary::default();
        summary.record(&OrderState::Skipped(SkipReason::Stale));
        summary.record(&OrderState::Skipped(SkipReason::UnparseableTimestamp));
        summary.record(&OrderState::Skipped(SkipReason::Undated));
        summary.record(&OrderState::NoSku);
        summary.record(&OrderState::Fulfilled(vec![
            sku(AcquisitionOutcome::Acquired, 1, 1),
            sku(AcquisitionOutcome::NotInCatalog, 0, 0),
        ]));
        summary.record(&OrderState::AllFailed(vec![sku(
            AcquisitionOutcome::FetchFailed,
            0,
            2,
        )]));

        assert_eq!(summary.orders_seen, 6);
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.skipped_stale, 1);
        assert_eq!(summary.skipped_unparseable, 1);
        assert_eq!(summary.quarantined, 2);
        assert_eq!(summary.images_acquired, 1);
        assert_eq!(summary.failed_references, 3);
    }

    #[test]
    fn test_error_display() {
        let err = EngineError::Io {
            path: PathBuf::from("/out/multi_remote"),
            source: std::io::Error::other("denied"),
        };
        assert_eq!(err.to_string(), "Failed to create directory /out/multi_remote");
        assert!(AcquisitionOutcome::Acquired.is_acquired());
        assert!(!AcquisitionOutcome::NotInLibrary.is_acquired());
    }
}
