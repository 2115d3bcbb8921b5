//! End-to-end export flow tests with an in-memory record source
//!
//! These tests exercise the full pipeline: scope resolution, freshness
//! cache, per-key generation locking, format writing, and atomic
//! publication.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::{stream, StreamExt};
use netztest_export::adapters::traits::{RecordSource, RecordStream};
use netztest_export::core::export::ExportService;
use netztest_export::domain::record::ExportRecord;
use netztest_export::domain::scope::{ExportRequest, ExportScope};
use netztest_export::domain::{ExportError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::io::AsyncReadExt;

/// Record source serving a fixed record set, with optional delay and
/// failure injection
struct StaticSource {
    records: Vec<ExportRecord>,
    calls: AtomicUsize,
    delay: Duration,
    fail_fetch: bool,
    fail_stream: bool,
}

impl StaticSource {
    fn new(records: Vec<ExportRecord>) -> Self {
        Self {
            records,
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            fail_fetch: false,
            fail_stream: false,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    fn failing_stream(mut self) -> Self {
        self.fail_stream = true;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn fetch(&self, _scope: &ExportScope) -> Result<RecordStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_fetch {
            return Err(ExportError::Database("connection refused".to_string()));
        }
        if self.fail_stream {
            let items: Vec<Result<ExportRecord>> = vec![
                Ok(self.records[0].clone()),
                Err(ExportError::Database("connection reset".to_string())),
            ];
            return Ok(stream::iter(items).boxed());
        }
        let records = self.records.clone();
        Ok(stream::iter(records.into_iter().map(Ok)).boxed())
    }
}

fn sample_record(open_uuid: &str) -> ExportRecord {
    ExportRecord {
        open_uuid: Some(open_uuid.to_string()),
        open_test_uuid: Some(format!("O{open_uuid}")),
        time: Some(Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 5).unwrap()),
        cat_technology: Some("4G".to_string()),
        network_type: Some("LTE".to_string()),
        download_kbit: Some(51293),
        upload_kbit: Some(11512),
        ping_ms: Some(23.5),
        platform: Some("Android".to_string()),
        ..Default::default()
    }
}

/// Scenario A: uncached hours request produces a bare CSV response.
#[tokio::test]
async fn test_uncached_hours_request_produces_csv() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(StaticSource::new(vec![
        sample_record("P111"),
        sample_record("P222"),
    ]));
    let service = ExportService::new(source.clone(), dir.path(), false).unwrap();

    let request = ExportRequest {
        hours: Some("24".to_string()),
        ..Default::default()
    };
    let mut reply = service.export(&request).await.unwrap();

    assert_eq!(reply.content_type, "text/csv");
    assert_eq!(reply.attachment_filename, None);
    assert_eq!(source.calls(), 1);

    let mut body = Vec::new();
    reply.file.read_to_end(&mut body).await.unwrap();
    let text = String::from_utf8(body).unwrap();

    let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("open_uuid,open_test_uuid,time,"));
    assert!(lines[1].starts_with("P111,"));
    assert!(lines[2].starts_with("P222,"));

    assert!(dir.path().join("netztest-opendata_hours-024.csv").exists());
}

/// Scenario B: a fresh cached spreadsheet is served without touching the
/// record source.
#[tokio::test]
async fn test_fresh_cached_xlsx_is_served_without_query() {
    let dir = tempfile::tempdir().unwrap();
    let cached = b"cached spreadsheet bytes".to_vec();
    std::fs::write(dir.path().join("netztest-opendata-2024-01.xlsx"), &cached).unwrap();

    let source = Arc::new(StaticSource::new(vec![sample_record("P111")]));
    let service = ExportService::new(source.clone(), dir.path(), true).unwrap();

    let request = ExportRequest {
        year: Some("2024".to_string()),
        month: Some("01".to_string()),
        format: Some("xlsx".to_string()),
        ..Default::default()
    };
    let mut reply = service.export(&request).await.unwrap();

    assert_eq!(source.calls(), 0);
    assert_eq!(
        reply.content_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        reply.attachment_filename.as_deref(),
        Some("netztest-opendata-2024-01.xlsx")
    );
    assert_eq!(reply.content_length, cached.len() as u64);

    let mut body = Vec::new();
    reply.file.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, cached);
}

/// Scenario C: concurrent requests for the same uncached scope run exactly
/// one generation; both are served a complete artifact.
#[tokio::test]
async fn test_concurrent_requests_generate_once() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(
        StaticSource::new(vec![sample_record("P111")])
            .with_delay(Duration::from_millis(50)),
    );
    let service = Arc::new(ExportService::new(source.clone(), dir.path(), false).unwrap());

    let mut handles = Vec::new();
    for _ in 0..2 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let request = ExportRequest::default();
            service.export(&request).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(source.calls(), 1);

    let text = std::fs::read_to_string(dir.path().join("netztest-opendata.csv")).unwrap();
    let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("open_uuid,"));
    assert!(lines[1].starts_with("P111,"));
}

/// A record-source failure aborts the request and leaves the previous
/// (stale) canonical artifact untouched; it is not served as a fallback.
#[tokio::test]
async fn test_failed_generation_leaves_previous_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let canonical = dir.path().join("netztest-opendata.csv");
    std::fs::write(&canonical, b"previous artifact").unwrap();

    // age the artifact past the 3 hour current-scope threshold
    let stale = SystemTime::now() - Duration::from_secs(4 * 60 * 60);
    let file = std::fs::File::options().write(true).open(&canonical).unwrap();
    file.set_modified(stale).unwrap();
    drop(file);

    let source = Arc::new(StaticSource::new(vec![sample_record("P111")]).failing_fetch());
    let service = ExportService::new(source.clone(), dir.path(), false).unwrap();

    let result = service.export(&ExportRequest::default()).await;
    assert!(result.is_err());
    assert_eq!(source.calls(), 1);
    assert_eq!(std::fs::read(&canonical).unwrap(), b"previous artifact");
}

/// A mid-stream failure abandons the marker file without publishing.
#[tokio::test]
async fn test_stream_failure_does_not_publish() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(StaticSource::new(vec![sample_record("P111")]).failing_stream());
    let service = ExportService::new(source.clone(), dir.path(), false).unwrap();

    let result = service.export(&ExportRequest::default()).await;
    assert!(result.is_err());
    assert!(!dir.path().join("netztest-opendata.csv").exists());
    // the abandoned marker stays behind
    assert!(dir.path().join("netztest-opendata.csv_tmp").exists());
}

/// A stale canonical artifact with a fresh marker is still a HIT: some
/// other process is presumed to be regenerating it right now.
#[tokio::test]
async fn test_fresh_marker_serves_stale_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let canonical = dir.path().join("netztest-opendata.csv");
    std::fs::write(&canonical, b"previous artifact").unwrap();

    let stale = SystemTime::now() - Duration::from_secs(4 * 60 * 60);
    let file = std::fs::File::options().write(true).open(&canonical).unwrap();
    file.set_modified(stale).unwrap();
    drop(file);

    // fresh in-flight marker from "another process"
    std::fs::write(dir.path().join("netztest-opendata.csv_tmp"), b"partial").unwrap();

    let source = Arc::new(StaticSource::new(vec![sample_record("P111")]));
    let service = ExportService::new(source.clone(), dir.path(), false).unwrap();

    let mut reply = service.export(&ExportRequest::default()).await.unwrap();
    assert_eq!(source.calls(), 0);

    let mut body = Vec::new();
    reply.file.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, b"previous artifact");
}

/// Invalid scope parameters silently fall back to the current window.
#[tokio::test]
async fn test_invalid_parameters_fall_back_to_current() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(StaticSource::new(vec![sample_record("P111")]));
    let service = ExportService::new(source.clone(), dir.path(), false).unwrap();

    let request = ExportRequest {
        hours: Some("9999".to_string()),
        year: Some("1999".to_string()),
        month: Some("13".to_string()),
        ..Default::default()
    };
    let reply = service.export(&request).await.unwrap();

    assert_eq!(reply.content_type, "text/csv");
    assert!(dir.path().join("netztest-opendata.csv").exists());
}

/// With the zip policy enabled, a CSV request is served as an archive with
/// the license entry first.
#[tokio::test]
async fn test_zip_policy_wraps_csv() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(StaticSource::new(vec![sample_record("P111")]));
    let service = ExportService::new(source.clone(), dir.path(), true).unwrap();

    let request = ExportRequest {
        hours: Some("6".to_string()),
        ..Default::default()
    };
    let reply = service.export(&request).await.unwrap();

    assert_eq!(reply.content_type, "application/zip");
    assert_eq!(
        reply.attachment_filename.as_deref(),
        Some("netztest-opendata_hours-006.zip")
    );

    let archive_path = dir.path().join("netztest-opendata_hours-006.zip");
    let mut archive =
        zip::ZipArchive::new(std::fs::File::open(&archive_path).unwrap()).unwrap();
    assert_eq!(archive.len(), 2);
    assert_eq!(archive.by_index(0).unwrap().name(), "LIZENZ.txt");
    assert_eq!(
        archive.by_index(1).unwrap().name(),
        "netztest-opendata_hours-006.csv"
    );
}
