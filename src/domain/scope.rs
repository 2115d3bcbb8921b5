//! Export scope resolution
//!
//! This module classifies a raw export request into one of three mutually
//! exclusive time scopes and derives everything downstream code needs from
//! it: the candidate cache filenames, the freshness threshold, and the
//! output format. Resolution is pure and never fails; malformed or
//! out-of-range parameters silently degrade to the rolling current window.

use std::time::Duration;

/// Maximum hours window (one week, avoids unbounded queries)
pub const MAX_HOURS: u32 = 7 * 24;

const FILENAME_CSV_HOURS: &str = "netztest-opendata_hours-%HOURS%.csv";
const FILENAME_ZIP_HOURS: &str = "netztest-opendata_hours-%HOURS%.zip";
// The hours-scoped spreadsheet artifact shares the zip filename. This is
// part of the published contract and is kept as-is.
const FILENAME_XLSX_HOURS: &str = "netztest-opendata_hours-%HOURS%.zip";
const FILENAME_CSV_MONTH: &str = "netztest-opendata-%YEAR%-%MONTH%.csv";
const FILENAME_XLSX_MONTH: &str = "netztest-opendata-%YEAR%-%MONTH%.xlsx";
const FILENAME_ZIP_MONTH: &str = "netztest-opendata-%YEAR%-%MONTH%.zip";
const FILENAME_CSV_CURRENT: &str = "netztest-opendata.csv";
const FILENAME_XLSX_CURRENT: &str = "netztest-opendata.xlsx";
const FILENAME_ZIP_CURRENT: &str = "netztest-opendata.zip";

/// Time-window classification of an export request
///
/// Exactly one variant is active per request. Payloads are validated during
/// resolution, so downstream consumers never re-check ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    /// Trailing N hours, `1..=168`
    Hours(u32),
    /// One calendar month, `2000 < year < 2099`, `1..=12`
    Month { year: i32, month: u32 },
    /// Rolling trailing-31-day window
    Current,
}

impl ExportScope {
    /// Maximum age at which a cached artifact for this scope is reusable
    pub fn freshness_threshold(&self) -> Duration {
        match self {
            ExportScope::Hours(_) => Duration::from_secs(5 * 60),
            ExportScope::Month { .. } => Duration::from_secs(23 * 60 * 60),
            ExportScope::Current => Duration::from_secs(3 * 60 * 60),
        }
    }
}

/// Requested artifact encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Delimited text, optionally zip-wrapped per system-wide policy
    Csv,
    /// Spreadsheet workbook
    Xlsx,
}

/// Candidate cache filenames for a resolved scope, one per encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFilenames {
    pub csv: String,
    pub xlsx: String,
    pub zip: String,
}

/// Raw, unvalidated request parameters
///
/// All fields are optional strings exactly as they arrive from the caller;
/// parsing and range checks happen in [`ResolvedRequest::resolve`].
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub hours: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
    pub format: Option<String>,
}

/// Fully resolved export request
///
/// Carries the scope, its filenames and freshness threshold, and the
/// effective encoding. The threshold travels with the value so concurrent
/// requests for different scopes cannot influence each other.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub scope: ExportScope,
    pub format: OutputFormat,
    pub filenames: ScopeFilenames,
    pub threshold: Duration,
    /// Whether the CSV payload is wrapped in a zip archive (system-wide
    /// policy, never per-request)
    pub zip_wrapped: bool,
}

impl ResolvedRequest {
    /// Resolve raw parameters into a scope, filenames and threshold
    ///
    /// An `hours` value in `1..=168` wins over `year`/`month`. A valid
    /// `year`/`month` pair is used next. Anything else, including parse
    /// failures, resolves to [`ExportScope::Current`].
    pub fn resolve(request: &ExportRequest, zip_csv_policy: bool) -> Self {
        let scope = Self::resolve_scope(request);

        let format = match request.format.as_deref() {
            Some(token) if token.contains("xlsx") => OutputFormat::Xlsx,
            _ => OutputFormat::Csv,
        };

        let filenames = match scope {
            ExportScope::Hours(hours) => {
                let hours = format!("{hours:03}");
                ScopeFilenames {
                    csv: FILENAME_CSV_HOURS.replace("%HOURS%", &hours),
                    xlsx: FILENAME_XLSX_HOURS.replace("%HOURS%", &hours),
                    zip: FILENAME_ZIP_HOURS.replace("%HOURS%", &hours),
                }
            }
            ExportScope::Month { year, month } => {
                let year = year.to_string();
                let month = format!("{month:02}");
                ScopeFilenames {
                    csv: FILENAME_CSV_MONTH
                        .replace("%YEAR%", &year)
                        .replace("%MONTH%", &month),
                    xlsx: FILENAME_XLSX_MONTH
                        .replace("%YEAR%", &year)
                        .replace("%MONTH%", &month),
                    zip: FILENAME_ZIP_MONTH
                        .replace("%YEAR%", &year)
                        .replace("%MONTH%", &month),
                }
            }
            ExportScope::Current => ScopeFilenames {
                csv: FILENAME_CSV_CURRENT.to_string(),
                xlsx: FILENAME_XLSX_CURRENT.to_string(),
                zip: FILENAME_ZIP_CURRENT.to_string(),
            },
        };

        Self {
            scope,
            format,
            filenames,
            threshold: scope.freshness_threshold(),
            zip_wrapped: format == OutputFormat::Csv && zip_csv_policy,
        }
    }

    fn resolve_scope(request: &ExportRequest) -> ExportScope {
        if let Some(hours) = request.hours.as_deref() {
            if let Ok(hours) = hours.trim().parse::<u32>() {
                if (1..=MAX_HOURS).contains(&hours) {
                    return ExportScope::Hours(hours);
                }
            }
        }

        if let (Some(year), Some(month)) = (request.year.as_deref(), request.month.as_deref()) {
            if let (Ok(year), Ok(month)) =
                (year.trim().parse::<i32>(), month.trim().parse::<u32>())
            {
                if year > 2000 && year < 2099 && (1..=12).contains(&month) {
                    return ExportScope::Month { year, month };
                }
            }
        }

        ExportScope::Current
    }

    /// Filename of the artifact this request is served from
    pub fn artifact_filename(&self) -> &str {
        match self.format {
            OutputFormat::Xlsx => &self.filenames.xlsx,
            OutputFormat::Csv if self.zip_wrapped => &self.filenames.zip,
            OutputFormat::Csv => &self.filenames.csv,
        }
    }

    /// MIME type of the artifact
    pub fn content_type(&self) -> &'static str {
        match self.format {
            OutputFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            OutputFormat::Csv if self.zip_wrapped => "application/zip",
            OutputFormat::Csv => "text/csv",
        }
    }

    /// Attachment filename for the content-disposition header
    ///
    /// Only spreadsheet and archive responses carry a disposition; bare
    /// delimited text does not.
    pub fn attachment_filename(&self) -> Option<&str> {
        match self.format {
            OutputFormat::Xlsx => Some(self.artifact_filename()),
            OutputFormat::Csv if self.zip_wrapped => Some(self.artifact_filename()),
            OutputFormat::Csv => None,
        }
    }
}
