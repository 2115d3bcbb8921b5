//! Export command implementation
//!
//! This module implements the `export` command: resolve the requested
//! scope, run one cached export, and write the artifact to a file or
//! stdout.

use crate::adapters::postgresql::{PostgresClient, PostgresRecordSource};
use crate::config::load_config;
use crate::core::export::ExportService;
use crate::domain::scope::ExportRequest;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export the trailing N hours (1-168); wins over --year/--month
    #[arg(long)]
    pub hours: Option<String>,

    /// Export one calendar month: the year (2001-2098)
    #[arg(long)]
    pub year: Option<String>,

    /// Export one calendar month: the month (1-12)
    #[arg(long)]
    pub month: Option<String>,

    /// Output format: csv or xlsx
    #[arg(long, default_value = "csv")]
    pub format: String,

    /// Write the artifact to this path instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let config = load_config(config_path)?;

        let client = Arc::new(PostgresClient::new(config.database.clone())?);
        let source = Arc::new(PostgresRecordSource::new(
            client,
            config.export.geo_accuracy_detail_limit,
        ));
        let service = ExportService::new(
            source,
            config.export.cache_dir.clone(),
            config.export.zip_csv,
        )?;

        let request = ExportRequest {
            hours: self.hours.clone(),
            year: self.year.clone(),
            month: self.month.clone(),
            format: Some(self.format.clone()),
        };

        let mut reply = match service.export(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("❌ Export failed: {e}");
                return Ok(1);
            }
        };

        match &self.output {
            Some(path) => {
                let mut out = tokio::fs::File::create(path).await?;
                tokio::io::copy(&mut reply.file, &mut out).await?;
                println!(
                    "✅ Exported {} bytes ({}) to {}",
                    reply.content_length,
                    reply.content_type,
                    path.display()
                );
            }
            None => {
                let mut stdout = tokio::io::stdout();
                tokio::io::copy(&mut reply.file, &mut stdout).await?;
            }
        }

        Ok(0)
    }
}
