//! Adapters between raw bytes and the in-memory tables: CSV and xlsx readers
//! for the two inputs and the xlsx writer for the finished report.

pub mod csv_read;
pub mod excel_read;
pub mod excel_write;

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::schema::{Table, TableSchema};

/// Local file header signature shared by every xlsx (zip) container.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Tabular formats accepted for either input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Xlsx,
}

impl InputFormat {
    /// Picks the format from the file extension, falling back to sniffing the
    /// content for a zip container.
    pub fn detect(name: &str, bytes: &[u8]) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => InputFormat::Xlsx,
            Some("csv") | Some("txt") => InputFormat::Csv,
            _ if bytes.starts_with(ZIP_MAGIC) => InputFormat::Xlsx,
            _ => InputFormat::Csv,
        }
    }
}

/// An uploaded file: its display name and full contents.
#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    pub name: &'a str,
    pub bytes: &'a [u8],
}

impl<'a> Input<'a> {
    pub fn new(name: &'a str, bytes: &'a [u8]) -> Self {
        Self { name, bytes }
    }

    pub fn format(&self) -> InputFormat {
        InputFormat::detect(self.name, self.bytes)
    }
}

/// Reads every row of the input as text cells.
pub fn read_rows(input: &Input<'_>) -> Result<Vec<Vec<String>>> {
    let format = input.format();
    debug!(source = input.name, ?format, size = input.bytes.len(), "reading rows");
    match format {
        InputFormat::Csv => csv_read::read_rows(input.name, input.bytes),
        InputFormat::Xlsx => excel_read::read_rows(input.name, input.bytes),
    }
}

/// Reads the input and narrows it down to the columns described by `schema`.
pub fn read_table(input: &Input<'_>, schema: &TableSchema) -> Result<Table> {
    let rows = read_rows(input)?;
    schema.apply(rows, input.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension_then_content() {
        assert_eq!(InputFormat::detect("roster.CSV", b"PK\x03\x04"), InputFormat::Csv);
        assert_eq!(InputFormat::detect("roster.xlsx", b"a,b"), InputFormat::Xlsx);
        assert_eq!(InputFormat::detect("upload", b"PK\x03\x04rest"), InputFormat::Xlsx);
        assert_eq!(InputFormat::detect("upload", b"a,b\n"), InputFormat::Csv);
    }
}
