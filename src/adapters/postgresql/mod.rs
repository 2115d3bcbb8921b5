//! PostgreSQL record-source adapter.

pub mod client;
pub mod source;

pub use client::PostgresClient;
pub use source::PostgresRecordSource;
