//! Testing utilities and mock implementations.
//!
//! This module provides a mock image fetcher, an in-memory checkpoint store and
//! fixtures for building inventories and order feeds, allowing engine tests
//! without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use orderpix_core::testing::{fixtures, MockFetcher};
//!
//! let fetcher = MockFetcher::new();
//! fetcher.fail_with_status("http://cdn/b.jpg", 404).await;
//!
//! let feed = fixtures::order_feed(&[("03/14/2024", "9:05 PM", "ORD-1", "X1")]);
//! // Write the feed and run the engine...
//! ```

mod mock_checkpoint;
mod mock_fetcher;

pub use mock_checkpoint::MemoryCheckpointStore;
pub use mock_fetcher::{MockFetcher, MockResponse, RecordedFetch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{InventoryRecord, SourceKind};

    /// Banner lines the default configuration skips before the first order.
    pub const BANNER_ROWS: usize = 6;

    /// Create an inventory record.
    pub fn inventory_record(sku: &str, refs: &[&str], kind: SourceKind) -> InventoryRecord {
        InventoryRecord {
            sku: sku.to_string(),
            image_refs: refs.iter().map(|r| r.to_string()).collect(),
            source_kind: kind,
        }
    }

    /// Render inventory records as CSV, one quoted row each.
    pub fn inventory_csv(records: &[InventoryRecord]) -> String {
        records
            .iter()
            .map(|r| {
                format!(
                    "\"{}\",\"{}\",\"{}\"\n",
                    r.sku,
                    r.image_refs.join("|"),
                    r.source_kind.code()
                )
            })
            .collect()
    }

    /// Render an order feed preceded by [`BANNER_ROWS`] banner lines.
    ///
    /// Each order is `(date, time, order_id, skus)`.
    pub fn order_feed(orders: &[(&str, &str, &str, &str)]) -> String {
        let mut feed = String::new();
        for i in 0..BANNER_ROWS {
            feed.push_str(&format!("\"Report line {}\"\n", i + 1));
        }
        for (date, time, order_id, skus) in orders {
            feed.push_str(&format!(
                "\"{}\",\"{}\",\"{}\",\"{}\"\n",
                date, time, order_id, skus
            ));
        }
        feed
    }
}
