//! Archive wrapping for delimited-text exports
//!
//! Wraps the CSV payload in a zip container with exactly two entries, in
//! this order: the bundled data-license notice, then the CSV payload under
//! the scope-specific filename.

use crate::adapters::traits::RecordStream;
use crate::core::format::csv::write_csv;
use crate::domain::Result;
use std::io::{Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// License notice bundled as the first archive entry
pub const DATA_LICENSE: &str = include_str!("../../../assets/DATA_LICENSE.txt");

/// Name of the license entry inside the archive
pub const LICENSE_ENTRY_NAME: &str = "LIZENZ.txt";

/// Write the record stream as a zip-wrapped CSV into `sink`
///
/// `csv_entry_name` is the filename of the CSV payload entry (the scope's
/// CSV filename, not the archive's own name). Returns the number of data
/// rows written.
pub async fn write_zipped_csv<W: Write + Seek>(
    records: &mut RecordStream,
    sink: W,
    csv_entry_name: &str,
) -> Result<u64> {
    let mut archive = ZipWriter::new(sink);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    archive.start_file(LICENSE_ENTRY_NAME, options)?;
    archive.write_all(DATA_LICENSE.as_bytes())?;

    archive.start_file(csv_entry_name, options)?;
    let rows = write_csv(records, &mut archive).await?;

    archive.finish()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::ExportRecord;
    use futures::{stream, StreamExt};
    use std::io::Cursor;

    #[tokio::test]
    async fn test_archive_has_license_then_payload() {
        let record = ExportRecord {
            open_uuid: Some("P42".to_string()),
            ..Default::default()
        };
        let mut records: RecordStream = stream::iter(vec![Ok(record)]).boxed();
        let mut buffer = Cursor::new(Vec::new());
        let rows = write_zipped_csv(&mut records, &mut buffer, "netztest-opendata.csv")
            .await
            .unwrap();
        assert_eq!(rows, 1);

        let mut archive = zip::ZipArchive::new(Cursor::new(buffer.into_inner())).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.by_index(0).unwrap().name(), LICENSE_ENTRY_NAME);
        assert_eq!(archive.by_index(1).unwrap().name(), "netztest-opendata.csv");
    }

    #[tokio::test]
    async fn test_payload_matches_plain_csv_contract() {
        let record = ExportRecord {
            open_uuid: Some("P42".to_string()),
            ..Default::default()
        };
        let mut records: RecordStream = stream::iter(vec![Ok(record)]).boxed();
        let mut buffer = Cursor::new(Vec::new());
        write_zipped_csv(&mut records, &mut buffer, "payload.csv")
            .await
            .unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(buffer.into_inner())).unwrap();
        let mut payload = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("payload.csv").unwrap(), &mut payload)
            .unwrap();
        assert!(payload.starts_with("open_uuid,"));
        assert!(payload.contains("\r\n"));
        assert!(payload.contains("P42"));
    }
}
