use crate::types::date_interval::DateInterval;
use crate::types::extraction_kind::ExtractionKind;
use crate::types::output_format::OutputFormat;
use chrono::Datelike;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Destination of one persisted table.
///
/// Shaped `<root>/<kind>/year=YYYY/month=MM/day=DD/data-<uuid>.<ext>`, the
/// Hive-style partition layout most columnar tooling understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputLocation {
    path: PathBuf,
}

impl OutputLocation {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl fmt::Display for OutputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Derives partitioned output locations below a fixed root directory.
#[derive(Debug, Clone)]
pub struct OutputPathBuilder {
    output_root: PathBuf,
}

impl OutputPathBuilder {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    /// Location for `kind` data extracted over `interval`, partitioned by the
    /// interval's start date. Every call gets a fresh file name; no I/O happens.
    pub fn build(
        &self,
        interval: &DateInterval,
        kind: ExtractionKind,
        format: OutputFormat,
    ) -> OutputLocation {
        let start = interval.from_date();
        let path = self
            .output_root
            .join(kind.path_segment())
            .join(format!("year={:04}", start.year()))
            .join(format!("month={:02}", start.month()))
            .join(format!("day={:02}", start.day()))
            .join(format!("data-{}.{}", Uuid::new_v4(), format.extension()));
        OutputLocation { path }
    }
}
