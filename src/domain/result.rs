//! Result type alias for the export service

use super::errors::ExportError;

/// Result type alias for export operations
///
/// This is a convenience type alias that uses `ExportError` as the error type.
/// Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use netztest_export::domain::result::Result;
/// use netztest_export::domain::errors::ExportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ExportError::Database("connection refused".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ExportError>;
