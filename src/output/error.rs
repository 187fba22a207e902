use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Unsupported output format: `{0}`")]
    UnsupportedFormat(String),

    #[error("Failed to create output directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to create output file '{0}'")]
    FileCreation(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing parquet file '{0}'")]
    ParquetWrite(PathBuf, #[source] PolarsError),

    #[error("Encoding error writing JSON file '{0}'")]
    JsonWrite(PathBuf, #[source] PolarsError),
}
