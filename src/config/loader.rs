//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AppConfig;
use crate::domain::errors::ExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`AppConfig`]
/// 4. Applies environment variable overrides (`NETZTEST_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use netztest_export::config::load_config;
///
/// let config = load_config("netztest-export.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: AppConfig = toml::from_str(&contents)
        .map_err(|e| ExportError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ExportError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines - don't process env vars in comments
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `NETZTEST_*` prefix
///
/// Environment variables follow the pattern `NETZTEST_<SECTION>_<KEY>`,
/// e.g. `NETZTEST_DATABASE_CONNECTION_STRING` or `NETZTEST_EXPORT_ZIP_CSV`.
fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    if let Ok(val) = std::env::var("NETZTEST_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("NETZTEST_DATABASE_CONNECTION_STRING") {
        config.database.connection_string = val;
    }

    if let Ok(val) = std::env::var("NETZTEST_DATABASE_MAX_CONNECTIONS") {
        config.database.max_connections = val.parse().map_err(|_| {
            ExportError::Configuration(format!(
                "Invalid NETZTEST_DATABASE_MAX_CONNECTIONS value: {}",
                val
            ))
        })?;
    }

    if let Ok(val) = std::env::var("NETZTEST_EXPORT_CACHE_DIR") {
        config.export.cache_dir = val.into();
    }

    if let Ok(val) = std::env::var("NETZTEST_EXPORT_ZIP_CSV") {
        config.export.zip_csv = val.parse().map_err(|_| {
            ExportError::Configuration(format!("Invalid NETZTEST_EXPORT_ZIP_CSV value: {}", val))
        })?;
    }

    if let Ok(val) = std::env::var("NETZTEST_EXPORT_GEO_ACCURACY_DETAIL_LIMIT") {
        config.export.geo_accuracy_detail_limit = val.parse().map_err(|_| {
            ExportError::Configuration(format!(
                "Invalid NETZTEST_EXPORT_GEO_ACCURACY_DETAIL_LIMIT value: {}",
                val
            ))
        })?;
    }

    Ok(())
}
