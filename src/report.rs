//! Spreadsheet output.

use crate::distance::DistanceResult;
use crate::error::ReportError;
use rust_xlsxwriter::Workbook;
use std::path::Path;

pub const SHEET_NAME: &str = "Localities";
pub const HEADER: [&str; 3] = ["Locality", "Driving distance", "Driving duration (mins)"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub name: String,
    pub distance: String,
    /// `None` renders as an empty cell, never as zero.
    pub duration_minutes: Option<u32>,
}

impl From<&DistanceResult> for ReportRow {
    fn from(result: &DistanceResult) -> Self {
        Self {
            name: result.locality_name.clone(),
            distance: result.distance_text.clone(),
            duration_minutes: result.duration_minutes,
        }
    }
}

pub fn build_rows(results: &[DistanceResult]) -> Vec<ReportRow> {
    results.iter().map(ReportRow::from).collect()
}

/// Write the header and rows to `path`, replacing any existing file.
pub fn write_workbook(path: &Path, rows: &[ReportRow]) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, &row.name)?;
        sheet.write_string(r, 1, &row.distance)?;
        if let Some(minutes) = row.duration_minutes {
            sheet.write_number(r, 2, minutes)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}
