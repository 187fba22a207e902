//! Decodes raw API payloads into Polars DataFrames, one decoder per [`ExtractionKind`].

use crate::types::extraction_kind::ExtractionKind;
use polars::prelude::*;
use std::io::Cursor;

/// Decodes a response body of the given kind into a DataFrame.
///
/// Column names are kept exactly as they appear in the payload, whitespace included.
pub fn decode(kind: ExtractionKind, body: Vec<u8>) -> PolarsResult<DataFrame> {
    match kind {
        ExtractionKind::Solar => decode_json_records(body),
        ExtractionKind::Wind => decode_csv(body),
    }
}

/// Parses a JSON array of flat records, one row per record.
fn decode_json_records(body: Vec<u8>) -> PolarsResult<DataFrame> {
    JsonReader::new(Cursor::new(body))
        .with_json_format(JsonFormat::Json)
        .finish()
}

/// Parses delimited text whose first line is the header.
fn decode_csv(body: Vec<u8>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(body))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_solar_json() -> Result<(), Box<dyn std::error::Error>> {
        let body = br#"[
            {"Naive_Timestamp ": 1717977600000, " Variable": 991, "value": 31.4485644825,
             "Last Modified utc": 1717977600000},
            {"Naive_Timestamp ": 1717981200000, " Variable": 991, "value": 29.5,
             "Last Modified utc": 1717981200000}
        ]"#;

        let df = decode(ExtractionKind::Solar, body.to_vec())?;

        assert_eq!(df.shape(), (2, 4));
        assert_eq!(df.column("Naive_Timestamp ")?.dtype(), &DataType::Int64);
        assert_eq!(df.column("value")?.dtype(), &DataType::Float64);
        assert_eq!(df.column(" Variable")?.i64()?.get(1), Some(991));
        Ok(())
    }

    #[test]
    fn test_decode_wind_csv_keeps_raw_headers() -> Result<(), Box<dyn std::error::Error>> {
        let body = b"Naive_Timestamp , Variable,value,Last Modified utc\n\
            2024-06-10 00:00:00+00:00,991,12.5,2024-06-10 01:00:00+00:00\n\
            2024-06-10 01:00:00+00:00,991,13.25,2024-06-10 02:00:00+00:00\n";

        let df = decode(ExtractionKind::Wind, body.to_vec())?;

        assert_eq!(df.height(), 2);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(
            names,
            ["Naive_Timestamp ", " Variable", "value", "Last Modified utc"]
        );
        assert_eq!(df.column("value")?.f64()?.get(1), Some(13.25));
        Ok(())
    }

    #[test]
    fn test_decode_malformed_json_fails() {
        let result = decode(ExtractionKind::Solar, b"{not json".to_vec());
        assert!(result.is_err());
    }
}
