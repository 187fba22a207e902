//! The entry point of the crate: [`ExtractionRunner`] drives a full extraction
//! run over every [`ExtractionKind`] for a [`DateInterval`].

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::output::path::{OutputLocation, OutputPathBuilder};
use crate::output::sink::{FileSink, RecordSink};
use crate::types::date_interval::DateInterval;
use crate::types::extraction_kind::ExtractionKind;
use crate::types::record_table::RawRecordTable;
use crate::weather_data::fetcher::RemoteFetcher;
use crate::weather_data::normalizer::normalize;
use log::info;
use polars::prelude::{concat_lf_diagonal, DataFrame, IntoLazy, LazyFrame, UnionArgs};

/// Fetches, normalizes and persists renewable-generation data.
///
/// A run walks the kinds in [`ExtractionKind::ALL`] order. For each kind it
/// downloads every date of the interval in ascending order, stacks the daily
/// tables, normalizes the result and hands it to the sink. Execution is
/// strictly sequential and blocking.
///
/// # Examples
///
/// ```no_run
/// use renewables_extractor::{DateInterval, ExtractionRunner, ExtractorConfig, ExtractorError};
/// use chrono::NaiveDate;
///
/// # fn main() -> Result<(), ExtractorError> {
/// let mut runner = ExtractionRunner::new(ExtractorConfig::default())?;
/// let interval = DateInterval::new(
///     NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
/// );
/// for location in runner.run(&interval, "my-api-key")? {
///     println!("wrote {}", location);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ExtractionRunner<S = FileSink> {
    config: ExtractorConfig,
    fetcher: RemoteFetcher,
    paths: OutputPathBuilder,
    sink: S,
}

impl ExtractionRunner<FileSink> {
    /// Creates a runner that writes to the local filesystem below `config.output_root`.
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::with_sink(config, FileSink)
    }
}

impl<S: RecordSink> ExtractionRunner<S> {
    /// Creates a runner that hands normalized tables to `sink`.
    pub fn with_sink(config: ExtractorConfig, sink: S) -> Result<Self, ExtractorError> {
        let fetcher = RemoteFetcher::new(&config)?;
        let paths = OutputPathBuilder::new(config.output_root.clone());
        Ok(Self {
            config,
            fetcher,
            paths,
            sink,
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Extracts every kind over `interval` and persists one table per kind.
    ///
    /// Returns the written locations in kind order.
    ///
    /// # Errors
    ///
    /// * [`ExtractorError::InvalidDate`] if `interval` ends before it starts; no request is made.
    /// * [`ExtractorError::WeatherData`] if a date could not be downloaded or decoded.
    /// * [`ExtractorError::SchemaValidation`] if the data does not fit the canonical schema.
    /// * [`ExtractorError::Output`] if the sink fails.
    ///
    /// Kinds finished before a failure stay written.
    pub fn run(
        &mut self,
        interval: &DateInterval,
        api_key: &str,
    ) -> Result<Vec<OutputLocation>, ExtractorError> {
        ensure_valid(interval)?;
        info!("Extracting data for timespan: {}", interval);

        let format = self.config.output_format;
        let mut written = Vec::with_capacity(ExtractionKind::ALL.len());
        for kind in ExtractionKind::ALL {
            info!("Running extractor {}", kind);
            let raw = self.extract(kind, interval, api_key)?;
            let table = normalize(raw)?;

            let location = self.paths.build(interval, kind, format);
            info!(
                "Extraction complete for {} ({} rows), writing to {}",
                kind,
                table.height(),
                location
            );
            self.sink.write(&location, table, format)?;
            written.push(location);
        }
        Ok(written)
    }

    /// Downloads `kind` for every date in `interval` and stacks the results,
    /// ordered by date and then by row order within each day.
    pub fn extract(
        &self,
        kind: ExtractionKind,
        interval: &DateInterval,
        api_key: &str,
    ) -> Result<RawRecordTable, ExtractorError> {
        ensure_valid(interval)?;

        let mut frames = Vec::with_capacity(interval.num_days());
        for date in interval.dates() {
            frames.push(self.fetcher.fetch(kind, date, api_key)?.frame);
        }
        concat_frames(frames)
    }
}

fn ensure_valid(interval: &DateInterval) -> Result<(), ExtractorError> {
    if interval.is_valid() {
        Ok(())
    } else {
        Err(ExtractorError::InvalidDate {
            from: interval.from_date(),
            to: interval.to_date(),
        })
    }
}

/// Stacks frames vertically, matching columns by name and widening numeric
/// columns to a common type where days disagree. Days without any records are
/// skipped.
fn concat_frames(frames: Vec<DataFrame>) -> Result<RawRecordTable, ExtractorError> {
    let lazy_frames: Vec<LazyFrame> = frames
        .into_iter()
        .filter(|frame| frame.width() > 0)
        .map(|frame| frame.lazy())
        .collect();
    if lazy_frames.is_empty() {
        return Ok(RawRecordTable::new(DataFrame::empty()));
    }

    let frame = concat_lf_diagonal(
        lazy_frames,
        UnionArgs {
            rechunk: true,
            to_supertypes: true,
            ..Default::default()
        },
    )
    .and_then(|lazy| lazy.collect())
    .map_err(ExtractorError::Concat)?;
    Ok(RawRecordTable::new(frame))
}
