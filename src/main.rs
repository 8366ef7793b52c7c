use anyhow::Result;
use clap::Parser;
use flatload::db;
use flatload::fs_scan::{check_directory_structure, list_files};
use flatload::ingest::load_file_to_db;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "flatload")]
#[command(about = "Bulk-load delimited files from a directory into Postgres tables")]
struct Args {
    /// Directory containing the CSV files to load
    data_dir: PathBuf,

    /// Postgres connection string (or set DATABASE_URL env var)
    #[arg(long)]
    database_url: Option<String>,

    /// Load every file into this table instead of one table per file
    #[arg(short, long)]
    table: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;

    check_directory_structure(&args.data_dir)?;

    let pool = db::init_pool(&database_url).await?;

    let mut summaries = Vec::new();
    for file in list_files(&args.data_dir)? {
        let table = match &args.table {
            Some(t) => t.clone(),
            None => table_name_for(&file),
        };
        let summary = load_file_to_db(&pool, &file, &table).await?;
        info!(
            "Loaded {} rows from {} into {} in {} chunks (run {})",
            summary.rows_loaded,
            file.display(),
            summary.table_name,
            summary.chunks_loaded,
            summary.run_id
        );
        summaries.push(summary);
    }

    println!("{}", serde_json::to_string_pretty(&summaries)?);

    Ok(())
}

/// Derive a SQL-safe table name from the file stem.
fn table_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table");
    let name: String = stem
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        format!("t_{}", name)
    } else {
        name
    }
}
