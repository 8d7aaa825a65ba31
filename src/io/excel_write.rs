use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::debug;

use crate::error::Result;
use crate::report::Report;

/// Name of the single worksheet holding the report.
pub const REPORT_SHEET: &str = "Report";
/// Header row of the attendance table.
pub const TABLE_HEADERS: [&str; 3] = ["Device_Name", "Attendance", "Category"];
/// Label heading the summary block.
pub const SUMMARY_LABEL: &str = "Meeting Attendance - Summary";

pub const TITLE_ROW: u32 = 0;
/// Row holding the attendance table header. Row 1 stays blank.
pub const TABLE_START_ROW: u32 = 2;
/// Distance between the last table row and the summary label, counted as in
/// `TABLE_START_ROW + row_count + SUMMARY_GAP`.
const SUMMARY_GAP: u32 = 2;

/// First row of the summary block for a table with `row_count` data rows.
pub fn summary_start_row(row_count: usize) -> u32 {
    TABLE_START_ROW + row_count as u32 + SUMMARY_GAP
}

/// Serialises the report into an in-memory xlsx file.
pub fn write_report_to_buffer(report: &Report) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(report)?;
    Ok(workbook.save_to_buffer()?)
}

/// Writes the report to the given path.
pub fn write_report(path: &Path, report: &Report) -> Result<()> {
    let mut workbook = build_workbook(report)?;
    workbook.save(path)?;
    Ok(())
}

fn build_workbook(report: &Report) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(REPORT_SHEET)?;
    worksheet.set_column_width(0, 32)?;
    worksheet.set_column_width(2, 14)?;

    worksheet.write_string(TITLE_ROW, 0, &report.title)?;

    for (col_idx, header) in TABLE_HEADERS.iter().enumerate() {
        worksheet.write_string(TABLE_START_ROW, col_idx as u16, *header)?;
    }
    for (row_idx, row) in report.rows.iter().enumerate() {
        let sheet_row = TABLE_START_ROW + 1 + row_idx as u32;
        worksheet.write_string(sheet_row, 0, &row.device_name)?;
        worksheet.write_number(sheet_row, 1, row.attendance)?;
        worksheet.write_string(sheet_row, 2, row.category.label())?;
    }
    if !report.rows.is_empty() {
        let last_row = TABLE_START_ROW + report.rows.len() as u32;
        worksheet.autofilter(TABLE_START_ROW, 0, last_row, (TABLE_HEADERS.len() - 1) as u16)?;
    }

    // The label row's second cell is left blank.
    let summary_row = summary_start_row(report.rows.len());
    worksheet.write_string(summary_row, 0, SUMMARY_LABEL)?;
    for (offset, line) in report.summary.iter().enumerate() {
        let sheet_row = summary_row + 1 + offset as u32;
        worksheet.write_string(sheet_row, 0, &line.label)?;
        worksheet.write_number(sheet_row, 1, line.count)?;
    }

    debug!(
        row_count = report.rows.len(),
        summary_row,
        "report worksheet laid out"
    );
    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_follows_table_after_one_blank_row() {
        assert_eq!(summary_start_row(0), 4);
        assert_eq!(summary_start_row(3), 7);
    }
}
