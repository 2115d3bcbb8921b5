//! Flattened export record
//!
//! One record per finished measurement, with pseudonymized identifiers,
//! coarsened geolocation and derived metric fields. Records are immutable
//! once produced by a record source; writers only project them into rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cell value as it appears in an output row
///
/// Both writers consume this projection: the delimited-text writer renders
/// each cell as a string, the spreadsheet writer keeps native typing.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    /// String rendering used by the delimited-text writer
    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Bool(v) => v.to_string(),
        }
    }
}

fn text(value: &Option<String>) -> Cell {
    match value {
        Some(s) => Cell::Text(s.clone()),
        None => Cell::Empty,
    }
}

fn int(value: Option<i64>) -> Cell {
    match value {
        Some(v) => Cell::Int(v),
        None => Cell::Empty,
    }
}

fn float(value: Option<f64>) -> Cell {
    match value {
        Some(v) => Cell::Float(v),
        None => Cell::Empty,
    }
}

/// One flattened measurement row
///
/// Field order matches [`ExportRecord::HEADERS`]; the CSV header row and the
/// spreadsheet columns are derived from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Pseudonymized client identifier (`P` prefix)
    pub open_uuid: Option<String>,
    /// Pseudonymized test identifier (`O` prefix)
    pub open_test_uuid: Option<String>,
    /// Test start, UTC
    pub time: Option<DateTime<Utc>>,
    pub cat_technology: Option<String>,
    pub network_type: Option<String>,
    /// Coarsened latitude, possibly suppressed
    pub latitude: Option<f64>,
    /// Coarsened longitude, possibly suppressed
    pub longitude: Option<f64>,
    /// Location provider, restricted providers masked as `rastered`
    pub loc_src: Option<String>,
    /// Location accuracy in meters, rounded/clamped per policy
    pub loc_accuracy: Option<f64>,
    pub gkz: Option<String>,
    /// Always empty in the published data set
    pub zip_code: Option<String>,
    pub country_location: Option<String>,
    pub download_kbit: Option<i64>,
    pub upload_kbit: Option<i64>,
    /// Median ping in milliseconds, one decimal
    pub ping_ms: Option<f64>,
    pub lte_rsrp: Option<i64>,
    pub lte_rsrq: Option<i64>,
    pub server_name: Option<String>,
    pub test_duration: Option<i64>,
    pub num_threads: Option<i64>,
    pub platform: Option<String>,
    pub model: Option<String>,
    pub client_version: Option<String>,
    pub network_mcc_mnc: Option<String>,
    pub network_name: Option<String>,
    pub sim_mcc_mnc: Option<String>,
    pub nat_type: Option<String>,
    pub asn: Option<i64>,
    pub ip_anonym: Option<String>,
    pub ndt_download_kbit: Option<i64>,
    pub ndt_upload_kbit: Option<i64>,
    pub implausible: bool,
    pub signal_strength: Option<i64>,
    pub pinned: Option<bool>,
    pub kg_nr: Option<String>,
    pub gkz_sa: Option<String>,
    pub land_cover: Option<i64>,
    pub cell_area_code: Option<i64>,
    pub cell_location_id: Option<i64>,
    pub channel_number: Option<i64>,
    pub radio_band: Option<i64>,
}

impl ExportRecord {
    /// Stable column names, in output order
    pub const HEADERS: [&'static str; 41] = [
        "open_uuid",
        "open_test_uuid",
        "time",
        "cat_technology",
        "network_type",
        "latitude",
        "longitude",
        "loc_src",
        "loc_accuracy",
        "gkz",
        "zip_code",
        "country_location",
        "download_kbit",
        "upload_kbit",
        "ping_ms",
        "lte_rsrp",
        "lte_rsrq",
        "server_name",
        "test_duration",
        "num_threads",
        "platform",
        "model",
        "client_version",
        "network_mcc_mnc",
        "network_name",
        "sim_mcc_mnc",
        "nat_type",
        "asn",
        "ip_anonym",
        "ndt_download_kbit",
        "ndt_upload_kbit",
        "implausible",
        "signal_strength",
        "pinned",
        "kg_nr",
        "gkz_sa",
        "land_cover",
        "cell_area_code",
        "cell_location_id",
        "channel_number",
        "radio_band",
    ];

    /// Project the record into typed cells, one per header column
    pub fn cells(&self) -> Vec<Cell> {
        vec![
            text(&self.open_uuid),
            text(&self.open_test_uuid),
            match self.time {
                Some(t) => Cell::Text(t.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => Cell::Empty,
            },
            text(&self.cat_technology),
            text(&self.network_type),
            float(self.latitude),
            float(self.longitude),
            text(&self.loc_src),
            float(self.loc_accuracy),
            text(&self.gkz),
            text(&self.zip_code),
            text(&self.country_location),
            int(self.download_kbit),
            int(self.upload_kbit),
            float(self.ping_ms),
            int(self.lte_rsrp),
            int(self.lte_rsrq),
            text(&self.server_name),
            int(self.test_duration),
            int(self.num_threads),
            text(&self.platform),
            text(&self.model),
            text(&self.client_version),
            text(&self.network_mcc_mnc),
            text(&self.network_name),
            text(&self.sim_mcc_mnc),
            text(&self.nat_type),
            int(self.asn),
            text(&self.ip_anonym),
            int(self.ndt_download_kbit),
            int(self.ndt_upload_kbit),
            Cell::Bool(self.implausible),
            int(self.signal_strength),
            match self.pinned {
                Some(v) => Cell::Bool(v),
                None => Cell::Empty,
            },
            text(&self.kg_nr),
            text(&self.gkz_sa),
            int(self.land_cover),
            int(self.cell_area_code),
            int(self.cell_location_id),
            int(self.channel_number),
            int(self.radio_band),
        ]
    }

    /// Render the record as a delimited-text row
    pub fn csv_row(&self) -> Vec<String> {
        self.cells().iter().map(Cell::render).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cells_match_header_count() {
        let record = ExportRecord::default();
        assert_eq!(record.cells().len(), ExportRecord::HEADERS.len());
    }

    #[test]
    fn test_time_rendering() {
        let record = ExportRecord {
            time: Some(Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 5).unwrap()),
            ..Default::default()
        };
        let row = record.csv_row();
        assert_eq!(row[2], "2024-01-15 09:30:05");
    }

    #[test]
    fn test_empty_optionals_render_as_empty_strings() {
        let record = ExportRecord::default();
        let row = record.csv_row();
        assert_eq!(row[0], "");
        assert_eq!(row[5], "");
        // implausible defaults to false, not empty
        assert_eq!(row[31], "false");
    }

    #[test]
    fn test_numeric_rendering() {
        let record = ExportRecord {
            download_kbit: Some(51293),
            ping_ms: Some(23.5),
            ..Default::default()
        };
        let row = record.csv_row();
        assert_eq!(row[12], "51293");
        assert_eq!(row[14], "23.5");
    }
}
