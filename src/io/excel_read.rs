use std::io::Cursor;

use calamine::{DataType, Reader, Xlsx};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{Result, ReportError};

/// Reads the first worksheet of an xlsx upload as text cells.
///
/// Rows and columns are reported at their absolute sheet positions, so the
/// fixed offsets used for CSV uploads apply unchanged even when the sheet
/// starts with blank rows.
pub fn read_rows(source_name: &str, bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReportError::InvalidWorkbook(format!("'{source_name}' has no worksheet")))??;
    if range.is_empty() {
        return Err(ReportError::empty(source_name));
    }

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(|cell| cell_to_string(Some(cell))));
        rows.push(cells);
    }

    debug!(source = source_name, row_count = rows.len(), "parsed worksheet");
    Ok(rows)
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::DateTime(serial)) => excel_serial_to_string(*serial),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Renders an Excel serial date (days since 1899-12-30) the way a CSV export
/// would print it.
fn excel_serial_to_string(serial: f64) -> String {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|date| date.and_hms_opt(0, 0, 0));
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch
        .and_then(|epoch: NaiveDateTime| epoch.checked_add_signed(Duration::milliseconds(millis)))
        .map(|moment| moment.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| serial.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_dates_render_as_timestamps() {
        assert_eq!(excel_serial_to_string(45366.75), "2024-03-15 18:00:00");
        assert_eq!(excel_serial_to_string(1.0), "1899-12-31 00:00:00");
    }

    #[test]
    fn numeric_cells_drop_trailing_zero_fraction() {
        assert_eq!(cell_to_string(Some(&DataType::Float(3.0))), "3");
        assert_eq!(cell_to_string(Some(&DataType::Float(2.5))), "2.5");
        assert_eq!(cell_to_string(None), "");
    }

    #[test]
    fn garbage_bytes_are_not_a_workbook() {
        assert!(read_rows("roster.xlsx", b"not a zip").is_err());
    }
}
