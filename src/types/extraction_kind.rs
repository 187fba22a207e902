//! Defines the categories of renewable-generation data the weather API serves.

use std::fmt;

/// A category of renewable-generation data.
///
/// Each kind has its own resource on the weather API and its own payload
/// format: solar generation is served as a JSON array of records, wind
/// generation as CSV with a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionKind {
    /// Solar generation, served as `solargen.json`.
    Solar,
    /// Wind generation, served as `windgen.csv`.
    Wind,
}

impl ExtractionKind {
    /// Every kind, in the order a run extracts them.
    pub const ALL: [ExtractionKind; 2] = [ExtractionKind::Solar, ExtractionKind::Wind];

    /// Directory segment used for this kind in output paths.
    pub fn path_segment(&self) -> &'static str {
        match self {
            ExtractionKind::Solar => "solar",
            ExtractionKind::Wind => "wind",
        }
    }

    /// File name of this kind's resource below `{date}/renewables/` on the API.
    pub fn resource_name(&self) -> &'static str {
        match self {
            ExtractionKind::Solar => "solargen.json",
            ExtractionKind::Wind => "windgen.csv",
        }
    }
}

/// Allows formatting an `ExtractionKind` variant using its `path_segment`.
///
/// # Examples
///
/// ```
/// use renewables_extractor::ExtractionKind;
///
/// assert_eq!(format!("{}", ExtractionKind::Solar), "solar");
/// assert_eq!(ExtractionKind::Wind.to_string(), "wind");
/// ```
impl fmt::Display for ExtractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}
