//! PostgreSQL record source
//!
//! Builds the scope-filtered export query, streams rows without
//! materializing the full result set, and maps each row into an
//! [`ExportRecord`] with the geolocation policy applied.

use crate::adapters::postgresql::client::PostgresClient;
use crate::adapters::traits::{RecordSource, RecordStream};
use crate::domain::record::ExportRecord;
use crate::domain::scope::ExportScope;
use crate::domain::{ExportError, Result};
use crate::privacy::geo::{self, RawLocation};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_postgres::types::{FromSql, ToSql};
use tokio_postgres::{Row, RowStream};

const EXPORT_QUERY: &str = r#"SELECT
 t.open_uuid::text open_uuid,
 t.open_test_uuid::text open_test_uuid,
 t.time AT TIME ZONE 'UTC' "time",
 nt.group_name cat_technology,
 nt.name network_type,
 t.geo_lat, t.geo_long, t.geo_provider, t.geo_accuracy,
 t.gkz_bev::text gkz,
 t.country_location,
 t.speed_download download_kbit,
 t.speed_upload upload_kbit,
 t.ping_median,
 t.lte_rsrp,
 t.lte_rsrq,
 ts.name server_name,
 t.duration test_duration,
 t.num_threads,
 t.plattform platform,
 COALESCE(adm.fullname, t.model) model,
 t.client_software_version client_version,
 t.network_operator network_mcc_mnc,
 t.network_operator_name network_name,
 t.network_sim_operator sim_mcc_mnc,
 t.nat_type,
 t.public_ip_asn asn,
 t.client_public_ip_anonymized ip_anonym,
 ndt.s2cspd,
 ndt.c2sspd,
 COALESCE(t.implausible, false) implausible,
 t.signal_strength,
 t.pinned,
 t.kg_nr_bev::text kg_nr,
 t.gkz_sa::text gkz_sa,
 t.land_cover,
 t.cell_location_id,
 t.cell_area_code,
 t.channel_number,
 t.radio_band
 FROM test t
 LEFT JOIN network_type nt ON nt.uid = t.network_type
 LEFT JOIN device_map adm ON adm.codename = t.model
 LEFT JOIN test_server ts ON ts.uid = t.server_id
 LEFT JOIN test_ndt ndt ON t.uid = ndt.test_id
 WHERE t.deleted = false
 AND t.status = 'FINISHED'"#;

const ORDER_CLAUSE: &str = " ORDER BY t.uid";

/// Record source backed by the PostgreSQL measurement store
pub struct PostgresRecordSource {
    client: Arc<PostgresClient>,
    geo_detail_limit_m: f64,
}

impl PostgresRecordSource {
    /// Create a record source over a pooled client
    ///
    /// `geo_detail_limit_m` is the configured accuracy bound for the
    /// geolocation coarsening policy.
    pub fn new(client: Arc<PostgresClient>, geo_detail_limit_m: f64) -> Self {
        Self {
            client,
            geo_detail_limit_m,
        }
    }

    /// Time-window filter for a scope
    ///
    /// Scope payloads are validated integers, so they are formatted into the
    /// clause directly.
    fn time_clause(scope: &ExportScope) -> String {
        match scope {
            ExportScope::Hours(hours) => {
                format!(" AND t.time > now() - interval '{hours} hours'")
            }
            ExportScope::Month { year, month } => format!(
                " AND (EXTRACT (month FROM t.time AT TIME ZONE 'UTC') = {month}) \
                  AND (EXTRACT (year FROM t.time AT TIME ZONE 'UTC') = {year})"
            ),
            ExportScope::Current => " AND t.time > current_date - interval '31 days'".to_string(),
        }
    }
}

#[async_trait]
impl RecordSource for PostgresRecordSource {
    async fn fetch(&self, scope: &ExportScope) -> Result<RecordStream> {
        let sql = format!(
            "{}{}{}",
            EXPORT_QUERY,
            Self::time_clause(scope),
            ORDER_CLAUSE
        );

        let conn = self.client.get_connection().await?;

        let params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        let rows = conn
            .query_raw(&sql, params)
            .await
            .map_err(|e| ExportError::Database(format!("Export query failed: {}", e)))?;

        tracing::debug!(scope = ?scope, "Export query started");

        Ok(Box::pin(RecordRows {
            _conn: conn,
            inner: Box::pin(rows),
            detail_limit: self.geo_detail_limit_m,
        }))
    }
}

/// Row stream that owns its pooled connection
///
/// The connection lease must outlive the row stream, so both travel
/// together until the consumer drops the stream.
struct RecordRows {
    _conn: deadpool_postgres::Object,
    inner: Pin<Box<RowStream>>,
    detail_limit: f64,
}

impl Stream for RecordRows {
    type Item = Result<ExportRecord>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => Poll::Ready(Some(map_row(&row, this.detail_limit))),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(ExportError::Database(format!(
                "Row fetch failed: {}",
                e
            ))))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

fn col<'a, T: FromSql<'a>>(row: &'a Row, name: &str) -> Result<T> {
    row.try_get(name)
        .map_err(|e| ExportError::Record(format!("column {name}: {e}")))
}

fn map_row(row: &Row, detail_limit: f64) -> Result<ExportRecord> {
    let location = geo::coarsen(
        &RawLocation {
            latitude: col(row, "geo_lat")?,
            longitude: col(row, "geo_long")?,
            accuracy: col(row, "geo_accuracy")?,
            provider: col(row, "geo_provider")?,
        },
        detail_limit,
    );

    let time: Option<NaiveDateTime> = col(row, "time")?;

    Ok(ExportRecord {
        open_uuid: col::<Option<String>>(row, "open_uuid")?.map(|u| format!("P{u}")),
        open_test_uuid: col::<Option<String>>(row, "open_test_uuid")?.map(|u| format!("O{u}")),
        time: time.map(|t| DateTime::<Utc>::from_naive_utc_and_offset(t, Utc)),
        cat_technology: col(row, "cat_technology")?,
        network_type: col(row, "network_type")?,
        latitude: location.latitude,
        longitude: location.longitude,
        loc_src: location.source,
        loc_accuracy: location.accuracy,
        gkz: col(row, "gkz")?,
        // constant empty column in the published data set
        zip_code: None,
        country_location: col(row, "country_location")?,
        download_kbit: col::<Option<i32>>(row, "download_kbit")?.map(i64::from),
        upload_kbit: col::<Option<i32>>(row, "upload_kbit")?.map(i64::from),
        // median ping arrives in nanoseconds, published as ms with one decimal
        ping_ms: col::<Option<i64>>(row, "ping_median")?
            .map(|ns| (ns as f64 / 100_000.0).round() / 10.0),
        lte_rsrp: col::<Option<i32>>(row, "lte_rsrp")?.map(i64::from),
        lte_rsrq: col::<Option<i32>>(row, "lte_rsrq")?.map(i64::from),
        server_name: col(row, "server_name")?,
        test_duration: col::<Option<i32>>(row, "test_duration")?.map(i64::from),
        num_threads: col::<Option<i32>>(row, "num_threads")?.map(i64::from),
        platform: col(row, "platform")?,
        model: col(row, "model")?,
        client_version: col(row, "client_version")?,
        network_mcc_mnc: col(row, "network_mcc_mnc")?,
        network_name: col(row, "network_name")?,
        sim_mcc_mnc: col(row, "sim_mcc_mnc")?,
        nat_type: col(row, "nat_type")?,
        asn: col(row, "asn")?,
        ip_anonym: col(row, "ip_anonym")?,
        // NDT rates arrive in Mbit/s, published as integer kbit
        ndt_download_kbit: col::<Option<f64>>(row, "s2cspd")?.map(|v| (v * 1000.0).round() as i64),
        ndt_upload_kbit: col::<Option<f64>>(row, "c2sspd")?.map(|v| (v * 1000.0).round() as i64),
        implausible: col(row, "implausible")?,
        signal_strength: col::<Option<i32>>(row, "signal_strength")?.map(i64::from),
        pinned: col(row, "pinned")?,
        kg_nr: col(row, "kg_nr")?,
        gkz_sa: col(row, "gkz_sa")?,
        land_cover: col::<Option<i32>>(row, "land_cover")?.map(i64::from),
        // area code and location id are swapped in the published schema
        cell_area_code: col::<Option<i32>>(row, "cell_location_id")?.map(i64::from),
        cell_location_id: col::<Option<i32>>(row, "cell_area_code")?.map(i64::from),
        channel_number: col::<Option<i32>>(row, "channel_number")?.map(i64::from),
        radio_band: col::<Option<i32>>(row, "radio_band")?.map(i64::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_time_clause() {
        let clause = PostgresRecordSource::time_clause(&ExportScope::Hours(24));
        assert_eq!(clause, " AND t.time > now() - interval '24 hours'");
    }

    #[test]
    fn test_month_time_clause() {
        let clause = PostgresRecordSource::time_clause(&ExportScope::Month {
            year: 2024,
            month: 3,
        });
        assert!(clause.contains("EXTRACT (month FROM t.time AT TIME ZONE 'UTC') = 3"));
        assert!(clause.contains("EXTRACT (year FROM t.time AT TIME ZONE 'UTC') = 2024"));
    }

    #[test]
    fn test_current_time_clause() {
        let clause = PostgresRecordSource::time_clause(&ExportScope::Current);
        assert_eq!(clause, " AND t.time > current_date - interval '31 days'");
    }

    #[test]
    fn test_query_filters_unfinished_and_deleted() {
        assert!(EXPORT_QUERY.contains("t.deleted = false"));
        assert!(EXPORT_QUERY.contains("t.status = 'FINISHED'"));
    }
}
