//! Format writers.
//!
//! Serialize an ordered record stream into one of the supported target
//! encodings. All writers consume the stream lazily, one record at a time,
//! and write directly to a caller-provided sink:
//!
//! - [`csv`] - delimited text, CRLF line endings, header row
//! - [`sheet`] - single-worksheet XLSX with native cell typing
//! - [`archive`] - zip container wrapping the CSV payload plus the bundled
//!   data license

pub mod archive;
pub mod csv;
pub mod sheet;

pub use archive::write_zipped_csv;
pub use csv::write_csv;
pub use sheet::write_xlsx;
