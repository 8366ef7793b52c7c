//! Bulk Loader - Fixed-size batch append loop over a structured row source

use crate::db::PgSink;
use crate::error::Result;
use crate::ingest::events::{LoadEvents, TracingEvents};
use crate::ingest::LoadSummary;
use crate::schema::{infer_table_schema, ColumnSpec};
use async_trait::async_trait;
use polars::prelude::*;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Rows per append batch.
pub const CHUNK_SIZE: usize = 15_000;

/// Storage abstraction the loader appends batches through.
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Append all rows of `batch` to `table`, creating the table if absent.
    async fn append_batch(&self, table: &str, schema: &[ColumnSpec], batch: &DataFrame)
        -> Result<()>;
}

/// Chunked bulk loader with a fixed batch size and an injected event sink.
pub struct BulkLoader {
    chunk_size: usize,
    events: Arc<dyn LoadEvents>,
}

impl BulkLoader {
    pub fn new(events: Arc<dyn LoadEvents>) -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            events,
        }
    }

    /// Load one delimited file into `table_name` through `sink`.
    ///
    /// The schema is inferred once from the first sample window; every batch
    /// is appended under that same column set. The first append failure
    /// aborts the load; batches already appended stay in place.
    pub async fn load_file(
        &self,
        sink: &dyn TableSink,
        file_path: &Path,
        table_name: &str,
    ) -> Result<LoadSummary> {
        let df = read_csv(file_path, self.chunk_size)?;
        let schema = infer_table_schema(&df.slice(0, self.chunk_size));

        let run_id = Uuid::new_v4().to_string();
        let total = df.height();
        let mut offset = 0usize;
        let mut chunk_index = 0usize;

        while offset < total {
            let batch = df.slice(offset as i64, self.chunk_size);
            chunk_index += 1;
            if let Err(e) = sink.append_batch(table_name, &schema, &batch).await {
                self.events.load_failed(table_name, chunk_index, &e.to_string());
                return Err(e);
            }
            self.events.chunk_loaded(table_name, chunk_index, batch.height());
            offset += batch.height();
        }

        Ok(LoadSummary {
            table_name: table_name.to_string(),
            rows_loaded: total as u64,
            chunks_loaded: chunk_index as u32,
            run_id,
        })
    }
}

/// Read the whole file, letting the reader's dtype inference see the same
/// window the schema sample uses.
fn read_csv(path: &Path, sample_rows: usize) -> Result<DataFrame> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_try_parse_dates(true)
        .with_infer_schema_length(Some(sample_rows))
        .finish()?
        .collect()?;
    Ok(df)
}

/// Load `file_path` into `table_name` on the given Postgres pool.
pub async fn load_file_to_db(
    pool: &PgPool,
    file_path: &Path,
    table_name: &str,
) -> Result<LoadSummary> {
    let sink = PgSink::new(pool.clone());
    let loader = BulkLoader::new(Arc::new(TracingEvents));
    loader.load_file(&sink, file_path, table_name).await
}
