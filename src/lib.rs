mod config;
mod error;
mod extractor;
mod output;
mod types;
mod weather_data;

pub use config::*;
pub use error::ExtractorError;
pub use extractor::ExtractionRunner;

pub use output::error::OutputError;
pub use output::path::{OutputLocation, OutputPathBuilder};
pub use output::sink::{write_to_file, FileSink, RecordSink};

pub use types::date_interval::DateInterval;
pub use types::extraction_kind::ExtractionKind;
pub use types::output_format::OutputFormat;
pub use types::record_table::*;

pub use weather_data::decoder::decode;
pub use weather_data::error::{SchemaValidationError, WeatherDataError};
pub use weather_data::fetcher::RemoteFetcher;
pub use weather_data::normalizer::normalize;
