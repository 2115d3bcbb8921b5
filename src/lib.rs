// Netztest Export - Cached open-data export service
// Licensed under the Apache License, Version 2.0

//! # Netztest Export
//!
//! Netztest Export serves a bounded window of network measurement records
//! from a PostgreSQL store as a downloadable open-data file (CSV, XLSX, or
//! a ZIP archive wrapping the CSV), with filesystem-based caching so
//! repeated requests never trigger redundant, expensive regeneration.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Resolving** raw request parameters into an export scope with cache
//!   filenames and a freshness threshold
//! - **Caching** published artifacts on the filesystem with advisory
//!   in-flight markers and per-key generation locks
//! - **Streaming** records lazily from the store through a format writer
//! - **Publishing** finished artifacts atomically, so readers never observe
//!   a partially written file
//!
//! ## Architecture
//!
//! The crate follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (cache, locks, publication, format writers)
//! - [`adapters`] - Record-source abstraction and PostgreSQL implementation
//! - [`domain`] - Scope resolution, records, errors
//! - [`privacy`] - Geolocation coarsening policy
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use netztest_export::adapters::postgresql::{PostgresClient, PostgresRecordSource};
//! use netztest_export::config::load_config;
//! use netztest_export::core::export::ExportService;
//! use netztest_export::domain::scope::ExportRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("netztest-export.toml")?;
//!
//!     let client = Arc::new(PostgresClient::new(config.database.clone())?);
//!     let source = Arc::new(PostgresRecordSource::new(
//!         client,
//!         config.export.geo_accuracy_detail_limit,
//!     ));
//!     let service = ExportService::new(
//!         source,
//!         config.export.cache_dir.clone(),
//!         config.export.zip_csv,
//!     )?;
//!
//!     // A request for the trailing 24 hours as (zip-wrapped) CSV
//!     let request = ExportRequest {
//!         hours: Some("24".to_string()),
//!         ..Default::default()
//!     };
//!     let reply = service.export(&request).await?;
//!
//!     println!("{} bytes, {}", reply.content_length, reply.content_type);
//!     Ok(())
//! }
//! ```
//!
//! ## Caching Model
//!
//! Every scope/encoding pair maps to one canonical filename in a shared
//! cache directory. A request is served from the cache while the artifact
//! (or its in-flight `_tmp` marker) is younger than the scope's freshness
//! threshold: 5 minutes for hour windows, 23 hours for calendar months,
//! 3 hours for the rolling current window. On a miss, one generation runs
//! per cache key, writes to the marker path, and publishes with an atomic
//! rename.
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`] with the
//! [`domain::ExportError`] enum. Invalid scope parameters are never an
//! error: they silently degrade to the rolling current window.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod privacy;
