use crate::config::ExtractorConfig;
use crate::types::extraction_kind::ExtractionKind;
use crate::types::record_table::RawRecordTable;
use crate::weather_data::decoder::decode;
use crate::weather_data::error::WeatherDataError;
use backon::{BlockingRetryable, ConstantBuilder};
use chrono::NaiveDate;
use log::{debug, info, warn};
use reqwest::blocking::Client;
use std::cell::Cell;
use std::thread;

/// Downloads one day of one [`ExtractionKind`] from the weather API.
///
/// Requests are blocking. A request that fails with a non-2xx status or a
/// transport error is retried after a fixed delay until the attempt budget is
/// spent. Payloads that arrive but fail to decode are not retried.
pub struct RemoteFetcher {
    config: ExtractorConfig,
    client: Client,
}

impl RemoteFetcher {
    pub fn new(config: &ExtractorConfig) -> Result<Self, WeatherDataError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(WeatherDataError::ClientBuild)?;
        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    /// Fetches and decodes the `kind` resource for `date`.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherDataError::ResourceDown`] once every attempt failed, and
    /// [`WeatherDataError::Decode`] if the body is not valid for the kind's format.
    pub fn fetch(
        &self,
        kind: ExtractionKind,
        date: NaiveDate,
        api_key: &str,
    ) -> Result<RawRecordTable, WeatherDataError> {
        let url = self.config.data_url(kind, date, api_key);
        let body = self.download_with_retry(&url)?;
        let frame = decode(kind, body).map_err(|source| WeatherDataError::Decode {
            kind,
            url: url.clone(),
            source,
        })?;
        debug!("Decoded {} rows of {} data for {}", frame.height(), kind, date);
        Ok(RawRecordTable::new(frame))
    }

    fn download_with_retry(&self, url: &str) -> Result<Vec<u8>, WeatherDataError> {
        let max_attempts = self.config.max_attempts;
        let backoff = ConstantBuilder::default()
            .with_delay(self.config.retry_delay)
            .with_max_times(max_attempts.saturating_sub(1) as usize);
        let attempts = Cell::new(0u32);

        let result = (|| {
            attempts.set(attempts.get() + 1);
            self.download(url)
        })
        .retry(backoff)
        .sleep(thread::sleep)
        .when(WeatherDataError::is_transient)
        .notify(|error, delay| {
            warn!(
                "Attempt {}/{} to GET {} failed, retrying in {:?}: {}",
                attempts.get(),
                max_attempts,
                url,
                delay,
                error
            );
        })
        .call();

        match result {
            Err(error) if error.is_transient() => {
                warn!("Giving up on {} after {} attempts: {}", url, attempts.get(), error);
                Err(WeatherDataError::ResourceDown {
                    url: url.to_string(),
                    attempts: attempts.get(),
                    last_error: Box::new(error),
                })
            }
            other => other,
        }
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, WeatherDataError> {
        info!("Downloading data from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| WeatherDataError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(if let Some(status) = e.status() {
                    WeatherDataError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    WeatherDataError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let bytes = response
            .bytes()
            .map_err(|e| WeatherDataError::NetworkRequest(url.to_string(), e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::time::{Duration, Instant};

    const WIND_CSV: &str = "Naive_Timestamp , Variable,value,Last Modified utc\n\
        2024-06-10 00:00:00+00:00,991,12.5,2024-06-10 01:00:00+00:00\n";

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn fetcher_for(server: &Server, retry_delay: Duration) -> RemoteFetcher {
        let config = ExtractorConfig::builder()
            .endpoint(server.url())
            .retry_delay(retry_delay)
            .build();
        RemoteFetcher::new(&config).unwrap()
    }

    #[test]
    fn test_fetch_wind_success() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/2024-06-10/renewables/windgen.csv")
            .match_query(Matcher::UrlEncoded("api_key".into(), "apikey".into()))
            .with_status(200)
            .with_header("content-type", "text/csv")
            .with_body(WIND_CSV)
            .create();

        let fetcher = fetcher_for(&server, Duration::ZERO);
        let table = fetcher
            .fetch(ExtractionKind::Wind, date(2024, 6, 10), "apikey")
            .unwrap();

        assert_eq!(table.height(), 1);
        assert_eq!(table.frame.width(), 4);
        mock.assert();
    }

    #[test]
    fn test_fetch_retries_three_times_then_resource_down() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/2024-06-20/renewables/windgen.csv")
            .match_query(Matcher::Any)
            .with_status(429)
            .expect(3)
            .create();

        let delay = Duration::from_millis(40);
        let fetcher = fetcher_for(&server, delay);
        let started = Instant::now();
        let result = fetcher.fetch(ExtractionKind::Wind, date(2024, 6, 20), "apikey");
        let elapsed = started.elapsed();

        match result {
            Err(WeatherDataError::ResourceDown {
                url,
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 3);
                assert!(url.ends_with("/2024-06-20/renewables/windgen.csv?api_key=apikey"));
                assert!(matches!(*last_error, WeatherDataError::HttpStatus { .. }));
            }
            other => panic!("Expected ResourceDown, got {:?}", other),
        }
        // Pauses fall between attempts only.
        assert!(elapsed >= delay * 2, "elapsed {:?}", elapsed);
        mock.assert();
    }

    #[test]
    fn test_successful_fetch_does_not_sleep() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/2024-06-10/renewables/windgen.csv")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(WIND_CSV)
            .expect(1)
            .create();

        let delay = Duration::from_secs(2);
        let fetcher = fetcher_for(&server, delay);
        let started = Instant::now();
        fetcher
            .fetch(ExtractionKind::Wind, date(2024, 6, 10), "apikey")
            .unwrap();

        assert!(started.elapsed() < delay);
        mock.assert();
    }

    #[test]
    fn test_fetch_succeeds_after_transient_failure() {
        let mut server = Server::new();
        let failing = server
            .mock("GET", "/2024-06-10/renewables/windgen.csv")
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(1)
            .create();
        let healthy = server
            .mock("GET", "/2024-06-10/renewables/windgen.csv")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(WIND_CSV)
            .expect(1)
            .create();

        let delay = Duration::from_millis(200);
        let fetcher = fetcher_for(&server, delay);
        let started = Instant::now();
        let table = fetcher
            .fetch(ExtractionKind::Wind, date(2024, 6, 10), "apikey")
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(table.height(), 1);
        assert!(elapsed >= delay, "elapsed {:?}", elapsed);
        assert!(elapsed < delay * 2, "elapsed {:?}", elapsed);
        failing.assert();
        healthy.assert();
    }

    #[test]
    fn test_decode_error_is_not_retried() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/2024-06-10/renewables/solargen.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{this is not json")
            .expect(1)
            .create();

        let fetcher = fetcher_for(&server, Duration::ZERO);
        let result = fetcher.fetch(ExtractionKind::Solar, date(2024, 6, 10), "apikey");

        assert!(matches!(
            result,
            Err(WeatherDataError::Decode {
                kind: ExtractionKind::Solar,
                ..
            })
        ));
        mock.assert();
    }
}
