use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{} is not a directory.", .0.display())]
    NotADirectory(PathBuf),

    #[error("Directory '{}' is empty.", .0.display())]
    EmptyDirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV read error: {0}")]
    Csv(#[from] polars::error::PolarsError),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Value conversion error: {0}")]
    Conversion(String),
}

pub type Result<T> = std::result::Result<T, LoadError>;
