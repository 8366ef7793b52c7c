//! Ingest Module - Chunked bulk loading of flat files into relational tables

pub mod events;
pub mod loader;

pub use events::{LoadEvents, TracingEvents};
pub use loader::{load_file_to_db, BulkLoader, TableSink, CHUNK_SIZE};

use serde::{Deserialize, Serialize};

/// Outcome of one file load.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Table the rows were appended to
    pub table_name: String,

    /// Total rows appended
    pub rows_loaded: u64,

    /// Number of append batches
    pub chunks_loaded: u32,

    /// Load run ID
    pub run_id: String,
}
