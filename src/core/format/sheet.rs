//! Spreadsheet writer
//!
//! Serializes a record stream into a single-worksheet XLSX workbook with
//! the same header/row contract as the delimited-text writer and native
//! cell typing for numbers and booleans. Rows are consumed one at a time;
//! the workbook itself buffers internally and is flushed to the sink when
//! the stream ends.

use crate::adapters::traits::RecordStream;
use crate::domain::record::{Cell, ExportRecord};
use crate::domain::Result;
use futures::StreamExt;
use rust_xlsxwriter::Workbook;
use std::io::Write;

/// Write the record stream as an XLSX workbook into `sink`
///
/// Returns the number of data rows written (excluding the header).
pub async fn write_xlsx<W: Write>(records: &mut RecordStream, mut sink: W) -> Result<u64> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (column, name) in ExportRecord::HEADERS.iter().enumerate() {
        worksheet.write_string(0, column as u16, *name)?;
    }

    let mut rows = 0u64;
    while let Some(record) = records.next().await {
        let record = record?;
        let row = (rows + 1) as u32;
        for (column, cell) in record.cells().into_iter().enumerate() {
            let column = column as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(value) => {
                    worksheet.write_string(row, column, value)?;
                }
                Cell::Int(value) => {
                    worksheet.write_number(row, column, value as f64)?;
                }
                Cell::Float(value) => {
                    worksheet.write_number(row, column, value)?;
                }
                Cell::Bool(value) => {
                    worksheet.write_boolean(row, column, value)?;
                }
            }
        }
        rows += 1;
    }

    let buffer = workbook.save_to_buffer()?;
    sink.write_all(&buffer)?;
    Ok(rows)
}
