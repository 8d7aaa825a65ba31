// Primitives for reading CSV uploads.

use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::error::{Result, ReportError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes the upload as UTF-8, retrying once as UTF-8 with a byte-order
/// mark. A leading BOM never reaches the parsed cells.
pub fn decode<'a>(source_name: &str, bytes: &'a [u8]) -> Result<&'a str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.strip_prefix('\u{feff}').unwrap_or(text)),
        Err(error) => {
            warn!(source = source_name, %error, "not plain UTF-8, retrying as utf-8-sig");
            let stripped = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            std::str::from_utf8(stripped).map_err(|_| ReportError::Encoding {
                source_name: source_name.to_string(),
            })
        }
    }
}

/// Parses every CSV record into a row of cells. Records may have differing
/// widths; the metadata block of a poll export rarely matches its data rows.
///
/// Blank lines come back as rows without any cell so that row offsets keep
/// counting physical lines of the file.
pub fn read_rows(source_name: &str, bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let text = decode(source_name, bytes)?;
    if text.trim().is_empty() {
        return Err(ReportError::empty(source_name));
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line) in split_lines(text).into_iter().enumerate() {
        if line.is_empty() {
            rows.push(Vec::new());
            continue;
        }
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes());
        for record in reader.records() {
            let lineno = idx + 1;
            let record = record.map_err(|error| {
                ReportError::malformed(source_name, format!("record {lineno}: {error}"))
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }
    }
    debug!(source = source_name, row_count = rows.len(), "parsed CSV");
    Ok(rows)
}

/// Splits the text on line terminators that are outside quoted fields.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, byte) in text.bytes().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => {
                lines.push(text[start..idx].trim_end_matches('\r'));
                start = idx + 1;
            }
            _ => {}
        }
    }
    if start < text.len() {
        lines.push(text[start..].trim_end_matches('\r'));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_is_stripped_from_first_cell() {
        let rows = read_rows("a.csv", b"\xEF\xBB\xBFDevice,Seat\nA,1\n").unwrap();
        assert_eq!(rows[0][0], "Device");
        assert_eq!(rows[1], vec!["A".to_string(), "1".to_string()]);
    }

    #[test]
    fn ragged_records_are_accepted() {
        let rows = read_rows("b.csv", b"Title\n\"x\",\"y\",\"z\"\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 3);
    }

    #[test]
    fn blank_lines_keep_their_row_position() {
        let rows = read_rows("b.csv", b"Title\n\nTopic,x\r\n\r\n\r\n1,A\n").unwrap();
        assert_eq!(rows.len(), 6);
        assert!(rows[1].is_empty());
        assert_eq!(rows[2], vec!["Topic".to_string(), "x".to_string()]);
        assert!(rows[3].is_empty() && rows[4].is_empty());
        assert_eq!(rows[5], vec!["1".to_string(), "A".to_string()]);
    }

    #[test]
    fn quoted_line_breaks_stay_in_one_row() {
        let rows = read_rows("b.csv", b"\"multi\n\nline\",x\n\nnext\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "multi\n\nline");
        assert!(rows[1].is_empty());
        assert_eq!(rows[2], vec!["next".to_string()]);
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert!(matches!(
            read_rows("a.csv", b""),
            Err(ReportError::EmptyInput { .. })
        ));
        assert!(matches!(
            read_rows("a.csv", b" \n\n"),
            Err(ReportError::EmptyInput { .. })
        ));
    }

    #[test]
    fn invalid_utf8_fails_after_fallback() {
        let err = read_rows("a.csv", b"\xEF\xBB\xBFDev\xFFice\n").unwrap_err();
        assert!(matches!(err, ReportError::Encoding { .. }));
    }
}
