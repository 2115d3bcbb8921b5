//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the service configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Max Connections: {}", config.database.max_connections);
        println!("  Cache Directory: {}", config.export.cache_dir.display());
        println!("  Zip CSV Artifacts: {}", config.export.zip_csv);
        println!(
            "  Geo Accuracy Detail Limit: {} m",
            config.export.geo_accuracy_detail_limit
        );

        Ok(0)
    }
}
