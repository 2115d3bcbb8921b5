//! Delimited-text writer
//!
//! Serializes a record stream as CSV with CRLF line endings: one header row
//! of stable column names, one row per record in source order. Fields are
//! quoted only when they contain the delimiter or quote character. Records
//! are consumed one at a time; nothing is buffered beyond the current row.

use crate::adapters::traits::RecordStream;
use crate::domain::record::ExportRecord;
use crate::domain::Result;
use futures::StreamExt;
use std::io::Write;

/// Write the record stream as CSV into `sink`
///
/// Returns the number of data rows written (excluding the header).
///
/// # Errors
///
/// Returns an error if the stream yields a failed record or the sink
/// rejects a write. The sink is left in an undefined partial state in that
/// case; callers publish atomically and abandon partial output.
pub async fn write_csv<W: Write>(records: &mut RecordStream, sink: W) -> Result<u64> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(sink);

    writer.write_record(ExportRecord::HEADERS)?;

    let mut rows = 0u64;
    while let Some(record) = records.next().await {
        let record = record?;
        writer.write_record(record.csv_row())?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}
