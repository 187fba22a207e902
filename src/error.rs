use crate::output::error::OutputError;
use crate::weather_data::error::{SchemaValidationError, WeatherDataError};
use chrono::NaiveDate;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("Invalid date range: from date {from} is after to date {to}")]
    InvalidDate { from: NaiveDate, to: NaiveDate },

    #[error(transparent)]
    WeatherData(#[from] WeatherDataError),

    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Failed to concatenate daily tables")]
    Concat(#[source] PolarsError),
}
