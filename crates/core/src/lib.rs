pub mod acquirer;
pub mod catalog;
pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod fulfillment;
pub mod library;
pub mod quarantine;
pub mod testing;

pub use acquirer::{
    copy_local, fetch_and_name, reference_file_name, single_remote_file_name, CopyError,
    FetchError, FileNaming, HttpFetcher, ImageFetcher,
};
pub use catalog::{
    CatalogError, Inventory, InventoryRecord, InventoryRows, OrderRecord, OrderRows, SourceKind,
};
pub use checkpoint::{CheckpointError, CheckpointStore, FileCheckpointStore, CHECKPOINT_FORMAT};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, FetchConfig,
    LoggingConfig, PathsConfig,
};
pub use engine::{
    AcquisitionOutcome, EngineConfig, EngineError, OrderEngine, OrderState, RunContext,
    RunSummary,
};
pub use fulfillment::{run_fulfillment, FulfillmentReport};
pub use library::ReferenceLibrary;
pub use quarantine::{QuarantineError, QuarantineManager, SweepReport};
