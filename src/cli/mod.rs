//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the export service
//! using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Netztest open-data export tool
#[derive(Parser, Debug)]
#[command(name = "netztest-export")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "netztest-export.toml",
        env = "NETZTEST_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "NETZTEST_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one cached export and write the artifact to a file or stdout
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["netztest-export", "export"]);
        assert_eq!(cli.config, "netztest-export.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["netztest-export", "--config", "custom.toml", "export"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_export_scope_args() {
        let cli = Cli::parse_from([
            "netztest-export",
            "export",
            "--year",
            "2024",
            "--month",
            "1",
            "--format",
            "xlsx",
        ]);
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.year.as_deref(), Some("2024"));
                assert_eq!(args.month.as_deref(), Some("1"));
                assert_eq!(args.format, "xlsx");
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["netztest-export", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }
}
