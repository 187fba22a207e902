pub mod date_interval;
pub mod extraction_kind;
pub mod output_format;
pub mod record_table;
