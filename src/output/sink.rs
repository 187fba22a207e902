//! Persistence of canonical tables.

use crate::output::error::OutputError;
use crate::output::path::OutputLocation;
use crate::types::output_format::OutputFormat;
use crate::types::record_table::CanonicalRecordTable;
use log::info;
use polars::prelude::*;
use std::fs;
use std::fs::File;
use std::path::Path;

/// Destination for normalized tables.
///
/// [`crate::ExtractionRunner`] hands each kind's table to its sink exactly once.
pub trait RecordSink {
    fn write(
        &mut self,
        location: &OutputLocation,
        table: CanonicalRecordTable,
        format: OutputFormat,
    ) -> Result<(), OutputError>;
}

/// Writes tables to the local filesystem, creating parent directories as needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSink;

impl RecordSink for FileSink {
    fn write(
        &mut self,
        location: &OutputLocation,
        table: CanonicalRecordTable,
        format: OutputFormat,
    ) -> Result<(), OutputError> {
        let mut frame = table.into_frame();
        write_frame(location.path(), &mut frame, format)
    }
}

/// Writes `frame` to `path` as `filetype` (`"json"` or `"parquet"`).
///
/// # Errors
///
/// Returns [`OutputError::UnsupportedFormat`] for any other filetype, before
/// anything is created on disk.
pub fn write_to_file(
    path: &Path,
    frame: &mut DataFrame,
    filetype: &str,
) -> Result<(), OutputError> {
    let format = filetype.parse::<OutputFormat>()?;
    write_frame(path, frame, format)
}

fn write_frame(
    path: &Path,
    frame: &mut DataFrame,
    format: OutputFormat,
) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| OutputError::DirCreation(parent.to_path_buf(), e))?;
    }

    info!("Writing {} rows to {}", frame.height(), path.display());
    let file =
        File::create(path).map_err(|e| OutputError::FileCreation(path.to_path_buf(), e))?;

    match format {
        OutputFormat::Json => JsonWriter::new(file)
            .with_json_format(JsonFormat::Json)
            .finish(frame)
            .map_err(|e| OutputError::JsonWrite(path.to_path_buf(), e))?,
        OutputFormat::Parquet => {
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(frame)
                .map_err(|e| OutputError::ParquetWrite(path.to_path_buf(), e))?;
        }
    }
    Ok(())
}
