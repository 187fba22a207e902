//! Wrappers around Polars `DataFrame`s that distinguish as-fetched data from
//! data already conforming to the canonical schema.

use polars::frame::DataFrame;

/// Name of the canonical observation timestamp column.
pub const TIMESTAMP_COLUMN: &str = "timestamp";
/// Name of the canonical last-modified column.
pub const LAST_MODIFIED_COLUMN: &str = "last_modified_utc";
/// Name of the canonical measurement column.
pub const VALUE_COLUMN: &str = "value";
/// Name of the canonical variable code column.
pub const VARIABLE_COLUMN: &str = "variable";

/// The canonical columns, in the order they are written.
pub const CANONICAL_COLUMNS: [&str; 4] = [
    TIMESTAMP_COLUMN,
    LAST_MODIFIED_COLUMN,
    VALUE_COLUMN,
    VARIABLE_COLUMN,
];

/// Tabular data as the weather API delivered it.
///
/// Column names and types are whatever the payload decoded to, typically with
/// human-readable labels and stray whitespace (`"Naive_Timestamp "`, `" Variable"`).
#[derive(Debug, Clone)]
pub struct RawRecordTable {
    /// The underlying Polars DataFrame.
    pub frame: DataFrame,
}

impl RawRecordTable {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// A table holding exactly the columns in [`CANONICAL_COLUMNS`].
///
/// `timestamp` and `last_modified_utc` are millisecond UTC datetimes, `value`
/// is a float and `variable` is an integer. The only way to obtain one is
/// [`crate::normalize`], which enforces this.
#[derive(Debug, Clone)]
pub struct CanonicalRecordTable {
    frame: DataFrame,
}

impl CanonicalRecordTable {
    pub(crate) fn new_unchecked(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

impl From<CanonicalRecordTable> for RawRecordTable {
    fn from(table: CanonicalRecordTable) -> Self {
        RawRecordTable::new(table.frame)
    }
}
