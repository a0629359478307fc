pub mod xlsx;

use crate::error::ExportError;
use crate::models::{AvailabilityRow, FieldValue, Report};
use tracing::debug;
use xlsx::{CellValue, WorkbookWriter};

pub const FILE_NAME: &str = "output_availability.xlsx";

pub const MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Spreadsheet ready to hand to the user
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

fn cell(value: &FieldValue) -> CellValue<'_> {
    match value {
        FieldValue::Text(s) => CellValue::Text(s),
        FieldValue::Number(n) => CellValue::Number(n.to_string()),
        FieldValue::Bool(b) => CellValue::Bool(*b),
    }
}

/// Serialize a report into an XLSX artifact: a header row, then one row per entry.
pub fn export_report(report: &Report) -> Result<Artifact, ExportError> {
    if report.is_empty() {
        return Err(ExportError::EmptyReport);
    }

    let mut writer = WorkbookWriter::new();
    let header: Vec<Option<CellValue<'_>>> = AvailabilityRow::HEADERS
        .iter()
        .map(|h| Some(CellValue::Text(*h)))
        .collect();
    writer.write_row(&header);

    for row in report.rows() {
        let date = row.date.format("%Y-%m-%d").to_string();
        let mut cells = Vec::with_capacity(AvailabilityRow::HEADERS.len());
        cells.push(Some(CellValue::Number(row.hotel_id.to_string())));
        cells.push(Some(CellValue::Text(&date)));
        cells.extend(row.optional_fields().into_iter().map(|f| f.map(cell)));
        writer.write_row(&cells);
    }

    debug!("Wrote {} spreadsheet rows", writer.row_count());

    Ok(Artifact {
        file_name: FILE_NAME,
        mime_type: MIME_TYPE,
        bytes: writer.finish()?,
    })
}
