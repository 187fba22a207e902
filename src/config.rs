//! Runtime configuration for an extraction run.

use crate::types::extraction_kind::ExtractionKind;
use crate::types::output_format::OutputFormat;
use bon::bon;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_OUTPUT_ROOT: &str = "./output";

/// Settings for talking to the weather API and writing results.
///
/// Create one with [`ExtractorConfig::default()`] or, to override individual
/// settings, with the builder:
///
/// ```
/// use renewables_extractor::{ExtractorConfig, OutputFormat};
/// use std::time::Duration;
///
/// let config = ExtractorConfig::builder()
///     .endpoint("http://weather.internal:8000".to_string())
///     .retry_delay(Duration::from_millis(250))
///     .output_format(OutputFormat::Json)
///     .build();
/// assert_eq!(config.max_attempts, 3);
/// assert_eq!(config.output_root.to_str(), Some("./output"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Base URL of the weather API, without a trailing path.
    pub endpoint: String,
    /// Total number of attempts per request, the first one included.
    pub max_attempts: u32,
    /// Fixed pause after each failed attempt.
    pub retry_delay: Duration,
    /// Directory below which partitioned output files are written.
    pub output_root: PathBuf,
    /// Format of the written files.
    pub output_format: OutputFormat,
    /// Per-request timeout. `None` keeps the HTTP client's default.
    pub request_timeout: Option<Duration>,
}

#[bon]
impl ExtractorConfig {
    /// Builds a configuration; every setting left unset takes its default.
    ///
    /// * `.endpoint(String)`: defaults to `http://localhost:8000`.
    /// * `.max_attempts(u32)`: defaults to `3`. Values below `1` are raised to `1`.
    /// * `.retry_delay(Duration)`: defaults to one second.
    /// * `.output_root(PathBuf)`: defaults to `./output`.
    /// * `.output_format(OutputFormat)`: defaults to Parquet.
    /// * `.request_timeout(Duration)`: unset by default.
    #[builder]
    pub fn new(
        endpoint: Option<String>,
        max_attempts: Option<u32>,
        retry_delay: Option<Duration>,
        output_root: Option<PathBuf>,
        output_format: Option<OutputFormat>,
        request_timeout: Option<Duration>,
    ) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            max_attempts: max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1),
            retry_delay: retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
            output_root: output_root.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT)),
            output_format: output_format.unwrap_or_default(),
            request_timeout,
        }
    }

    /// URL of the `kind` resource for `date`, authenticated with `api_key`.
    ///
    /// ```
    /// use renewables_extractor::{ExtractionKind, ExtractorConfig};
    /// use chrono::NaiveDate;
    ///
    /// let url = ExtractorConfig::default().data_url(
    ///     ExtractionKind::Wind,
    ///     NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
    ///     "apikey",
    /// );
    /// assert_eq!(url, "http://localhost:8000/2024-06-10/renewables/windgen.csv?api_key=apikey");
    /// ```
    pub fn data_url(&self, kind: ExtractionKind, date: NaiveDate, api_key: &str) -> String {
        format!(
            "{}/{}/renewables/{}?api_key={}",
            self.endpoint.trim_end_matches('/'),
            date.format("%Y-%m-%d"),
            kind.resource_name(),
            api_key
        )
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
