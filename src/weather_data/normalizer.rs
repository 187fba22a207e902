//! Turns raw API tables into [`CanonicalRecordTable`]s.
//!
//! Raw column labels are mapped through a fixed table (matched after trimming
//! whitespace), the two timestamp columns are coerced to millisecond UTC
//! datetimes, and the result is checked against the canonical schema. Any
//! mismatch is reported as a [`SchemaValidationError`]; nothing is coerced
//! beyond the timestamp parsing.

use crate::types::record_table::{
    CanonicalRecordTable, RawRecordTable, CANONICAL_COLUMNS, LAST_MODIFIED_COLUMN,
    TIMESTAMP_COLUMN, VALUE_COLUMN, VARIABLE_COLUMN,
};
use crate::weather_data::error::SchemaValidationError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;
use polars::prelude::*;
use std::collections::BTreeSet;

/// Raw labels used by the weather API and the canonical column each maps to.
const COLUMN_RENAMES: [(&str, &str); 3] = [
    ("Naive_Timestamp", TIMESTAMP_COLUMN),
    ("Variable", VARIABLE_COLUMN),
    ("Last Modified utc", LAST_MODIFIED_COLUMN),
];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const UTC: &str = "UTC";

/// Renames, coerces and validates a raw table into the canonical schema.
///
/// Running it on a table that is already canonical returns an identical table.
///
/// # Errors
///
/// * [`SchemaValidationError::ColumnSet`] if the renamed columns are not exactly
///   `timestamp`, `last_modified_utc`, `value` and `variable`.
/// * [`SchemaValidationError::ColumnType`] if `value` is not a float, `variable`
///   is not an integer, or a timestamp column has a type that cannot hold instants.
/// * [`SchemaValidationError::TimestampParse`] for a timestamp string that is not ISO 8601.
/// * [`SchemaValidationError::DuplicateColumn`] if two raw columns map to the same name.
pub fn normalize(raw: RawRecordTable) -> Result<CanonicalRecordTable, SchemaValidationError> {
    let mut frame = raw.frame;

    rename_columns(&mut frame)?;
    validate_column_set(&frame)?;

    for name in [TIMESTAMP_COLUMN, LAST_MODIFIED_COLUMN] {
        let converted = to_utc_datetime(frame.column(name)?)?;
        frame.with_column(converted)?;
    }
    validate_types(&frame)?;

    let frame = frame.select(CANONICAL_COLUMNS)?;
    Ok(CanonicalRecordTable::new_unchecked(frame))
}

fn canonical_name(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    COLUMN_RENAMES
        .iter()
        .find(|(label, _)| *label == trimmed)
        .map(|(_, canonical)| *canonical)
        .or_else(|| CANONICAL_COLUMNS.into_iter().find(|name| *name == trimmed))
}

fn rename_columns(frame: &mut DataFrame) -> Result<(), SchemaValidationError> {
    let raw_names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    for raw in raw_names {
        let Some(canonical) = canonical_name(&raw) else {
            continue;
        };
        if raw == canonical {
            continue;
        }
        if frame.get_column_index(canonical).is_some() {
            return Err(SchemaValidationError::DuplicateColumn { raw, canonical });
        }
        debug!("Renaming column '{}' to '{}'", raw, canonical);
        frame.rename(&raw, canonical.into())?;
    }
    Ok(())
}

fn validate_column_set(frame: &DataFrame) -> Result<(), SchemaValidationError> {
    let found: BTreeSet<&str> = frame
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();
    let expected: BTreeSet<&str> = CANONICAL_COLUMNS.into_iter().collect();

    if found != expected {
        return Err(SchemaValidationError::ColumnSet {
            expected: expected.into_iter().map(String::from).collect(),
            found: found.into_iter().map(String::from).collect(),
        });
    }
    Ok(())
}

fn validate_types(frame: &DataFrame) -> Result<(), SchemaValidationError> {
    for name in [TIMESTAMP_COLUMN, LAST_MODIFIED_COLUMN] {
        let dtype = frame.column(name)?.dtype();
        if !is_utc_datetime(dtype) {
            return Err(type_error(name, "UTC datetime", dtype));
        }
    }

    let dtype = frame.column(VALUE_COLUMN)?.dtype();
    if !dtype.is_float() {
        return Err(type_error(VALUE_COLUMN, "float", dtype));
    }

    let dtype = frame.column(VARIABLE_COLUMN)?.dtype();
    if !dtype.is_integer() {
        return Err(type_error(VARIABLE_COLUMN, "integer", dtype));
    }
    Ok(())
}

fn type_error(column: &str, expected: &'static str, found: &DataType) -> SchemaValidationError {
    SchemaValidationError::ColumnType {
        column: column.to_string(),
        expected,
        found: found.clone(),
    }
}

fn is_utc_datetime(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, Some(tz)) if tz.as_str() == UTC)
}

/// Converts epoch-millisecond integers, ISO 8601 strings or datetimes of any
/// unit to a millisecond UTC datetime column of the same name.
fn to_utc_datetime(column: &Column) -> Result<Series, SchemaValidationError> {
    let name = column.name().clone();

    let millis: Int64Chunked = match column.dtype() {
        DataType::Datetime(time_unit, _) => {
            let divisor = match time_unit {
                TimeUnit::Nanoseconds => 1_000_000,
                TimeUnit::Microseconds => 1_000,
                TimeUnit::Milliseconds => 1,
            };
            let physical = column.cast(&DataType::Int64)?;
            physical
                .i64()?
                .into_iter()
                .map(|value| value.map(|v| v.div_euclid(divisor)))
                .collect()
        }
        dtype if dtype.is_integer() => {
            let physical = column.cast(&DataType::Int64)?;
            physical.i64()?.clone()
        }
        DataType::String => column
            .str()?
            .into_iter()
            .map(|value| {
                value
                    .map(|text| {
                        parse_timestamp_millis(text).ok_or_else(|| {
                            SchemaValidationError::TimestampParse {
                                column: name.to_string(),
                                value: text.to_string(),
                            }
                        })
                    })
                    .transpose()
            })
            .collect::<Result<Int64Chunked, _>>()?,
        other => {
            return Err(type_error(
                name.as_str(),
                "epoch milliseconds, ISO 8601 string or datetime",
                other,
            ))
        }
    };

    Ok(millis
        .with_name(name)
        .into_datetime(TimeUnit::Milliseconds, Some(UTC.into()))
        .into_series())
}

/// Parses an ISO 8601 timestamp into epoch milliseconds. Values without an
/// offset are read as UTC; bare integers are taken as epoch milliseconds.
fn parse_timestamp_millis(text: &str) -> Option<i64> {
    let text = text.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.timestamp_millis());
    }
    for format in OFFSET_FORMATS {
        if let Ok(datetime) = DateTime::parse_from_str(text, format) {
            return Some(datetime.timestamp_millis());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.and_utc().timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp_millis());
    }
    text.parse::<i64>().ok()
}
