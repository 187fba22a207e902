use chrono::{Local, NaiveDate};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::{error, info};
use renewables_extractor::{
    DateInterval, ExtractionRunner, ExtractorConfig, ExtractorError, OutputFormat,
    DEFAULT_ENDPOINT, DEFAULT_OUTPUT_ROOT,
};
use std::env::{self, VarError};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

/// Days covered when `--from` is omitted, counted back from `--to`.
const DEFAULT_LOOKBACK_DAYS: u64 = 7;

const API_KEY_VAR: &str = "WEATHER_API_KEY";

#[derive(Parser)]
#[command(name = "renewables-extractor")]
#[command(
    about = "Extract solar and wind generation data into partitioned files",
    long_about = None
)]
struct Cli {
    /// From date in format YYYY-MM-DD (default: 7 days before --to)
    #[arg(long = "from")]
    from: Option<NaiveDate>,

    /// To date in format YYYY-MM-DD (default: today)
    #[arg(long = "to")]
    to: Option<NaiveDate>,

    /// Directory below which partitioned output is written
    #[arg(long, default_value = DEFAULT_OUTPUT_ROOT)]
    output_dir: PathBuf,

    /// Output file format: 'json' or 'parquet'
    #[arg(long, default_value = "parquet")]
    format: OutputFormat,

    /// Base URL of the weather API
    #[arg(long, env = "WEATHER_API_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let Some(api_key) = api_key(env::var(API_KEY_VAR)) else {
        usage_error("WEATHER_API_KEY must be set in the environment or a .env file")
    };
    let started = Instant::now();

    let to = cli.to.unwrap_or_else(|| Local::now().date_naive());
    let interval = match cli.from {
        Some(from) => DateInterval::new(from, to),
        None => match DateInterval::ending_at(to, DEFAULT_LOOKBACK_DAYS) {
            Some(interval) => interval,
            None => usage_error("TO date is too early to look back from"),
        },
    };
    info!("Transforming data within range {}", interval);

    let config = ExtractorConfig::builder()
        .endpoint(cli.endpoint)
        .output_root(cli.output_dir)
        .output_format(cli.format)
        .maybe_request_timeout(cli.timeout_secs.map(std::time::Duration::from_secs))
        .build();

    let result =
        ExtractionRunner::new(config).and_then(|mut runner| runner.run(&interval, &api_key));

    match result {
        Ok(locations) => {
            for location in &locations {
                info!("Wrote {}", location);
            }
            info!(
                "Finished in {:.3} seconds",
                started.elapsed().as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(ExtractorError::InvalidDate { .. }) => {
            usage_error("FROM date must be before TO date")
        }
        Err(e) => {
            error!("Extractor cannot finish: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn api_key(value: Result<String, VarError>) -> Option<String> {
    value.ok().filter(|key| !key.trim().is_empty())
}

fn usage_error(message: &str) -> ! {
    Cli::command().error(ErrorKind::ValueValidation, message).exit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_flag_is_rejected() {
        let result = Cli::try_parse_from(["renewables-extractor", "--api-key", "secret"]);
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::UnknownArgument));
    }

    #[test]
    fn test_api_key_requires_a_value() {
        assert_eq!(api_key(Ok("secret".to_string())), Some("secret".to_string()));
        assert_eq!(api_key(Ok("  ".to_string())), None);
        assert_eq!(api_key(Err(VarError::NotPresent)), None);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["renewables-extractor"]).unwrap();
        assert_eq!(cli.from, None);
        assert_eq!(cli.output_dir, PathBuf::from(DEFAULT_OUTPUT_ROOT));
        assert_eq!(cli.format, OutputFormat::Parquet);
    }
}
