//! Load Events - Structured progress sink for the chunked load loop

use tracing::{error, info};

/// Receives progress notifications from the bulk loader.
///
/// Injected into the loader so the load loop carries no global logging
/// calls and can be observed in tests without a logging backend attached.
pub trait LoadEvents: Send + Sync {
    /// A batch was appended to storage. `chunk_index` is 1-based.
    fn chunk_loaded(&self, table: &str, chunk_index: usize, rows: usize);

    /// A batch append failed; the load aborts after this event.
    fn load_failed(&self, table: &str, chunk_index: usize, message: &str);
}

/// Production sink: forwards load progress to `tracing`.
pub struct TracingEvents;

impl LoadEvents for TracingEvents {
    fn chunk_loaded(&self, table: &str, chunk_index: usize, rows: usize) {
        info!("Inserted chunk {} with {} rows into {}", chunk_index, rows, table);
    }

    fn load_failed(&self, table: &str, chunk_index: usize, message: &str) {
        error!("Error inserting chunk {} into {}: {}", chunk_index, table, message);
    }
}
