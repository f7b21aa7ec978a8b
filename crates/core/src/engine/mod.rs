//! Order resolution engine.
//!
//! The engine reads orders newer than the stored checkpoint, resolves each
//! SKU against the inventory and acquires its images:
//! - **Local kinds**: copied from the primary or secondary reference library
//! - **Single remote**: first reference downloaded, canonical rename
//! - **Multi remote**: every reference downloaded, order-prefixed names
//!
//! Orders with nothing acquired are undone and marked in quarantine. Failure
//! bookkeeping accumulates in a [`RunContext`] for the quarantine sweep.

mod config;
mod context;
mod runner;
mod types;

pub use config::EngineConfig;
pub use context::RunContext;
pub use runner::OrderEngine;
pub use types::{
    AcquisitionOutcome, EngineError, OrderState, RunSummary, SkipReason, SkuResult,
};
