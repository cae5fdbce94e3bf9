// Hotel ETL - Core Library
// Provider JSON → validated entities → one bulk insert into SQLite

pub mod error;
pub mod entities;
pub mod coerce;
pub mod location;
pub mod builder;
pub mod loader;
pub mod pipeline;
pub mod db;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Diagnostic, IngestError, IngestResult, Severity, Subject};
pub use entities::{Category, Chain, Entity, EntityId, EntityKey, EntityKind, Hotel};
pub use location::LocationResolver;
pub use builder::{Built, EntityBuilder, RecordBuilder};
pub use loader::{load_records, records_from_value, Record};
pub use pipeline::{
    Batch, BatchAssembler, BatchStats, DataPipeline, PersistenceGateway, PipelineState,
    RunSummary,
};
pub use db::{
    get_all_categories, get_all_chains, get_all_hotels, insert_entities, open_database,
    setup_database, verify_counts, SqliteGateway, TableCounts,
};
pub use crate::config::{Overrides, Settings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
