//! Configuration management.
//!
//! TOML-based configuration loading, parsing, and validation with support
//! for environment variable substitution (`${VAR_NAME}`) and `NETZTEST_*`
//! prefixed overrides.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [database]
//! connection_string = "host=db.example.com user=netztest dbname=rmbt password=${NETZTEST_DB_PASSWORD}"
//! max_connections = 4
//!
//! [export]
//! cache_dir = "/var/cache/netztest-export"
//! zip_csv = true
//! geo_accuracy_detail_limit = 2000.0
//!
//! [logging]
//! local_enabled = false
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use netztest_export::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("netztest-export.toml")?;
//! println!("Cache dir: {}", config.export.cache_dir.display());
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{AppConfig, ApplicationConfig, DatabaseConfig, ExportConfig, LoggingConfig};
