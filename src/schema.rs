//! Column and row offsets describing where the interesting data lives in the
//! two input files.
//!
//! The defaults reproduce the layout of a typical roster export and a Zoom
//! poll report. A JSON file can override any subset of the fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ReportError};

/// Column name given to the device identifier in both inputs.
pub const DEVICE_NAME_COLUMN: &str = "Device_Name";
/// Column name given to the attendance value of the poll export.
pub const ATTENDANCE_COLUMN: &str = "Attendance";
/// Column name given to the meeting timestamp of the poll export.
pub const TIMESTAMP_COLUMN: &str = "Meeting_Time";

/// Answer recorded by the poll when a participant had already submitted
/// ("I have already submitted" in Tamil). It counts as zero attendance.
pub const ALREADY_SUBMITTED: &str = "முன்பே சப்மிட் செய்துவிட்டேன்";

/// A generic "schema at a known offset" descriptor.
///
/// Rows are processed in this order: `skip_rows` raw rows are dropped, the
/// next row is consumed as the header when `has_header` is set, and finally
/// `skip_data_rows` further rows are dropped before data starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub columns: Vec<usize>,
    pub names: Vec<String>,
    pub skip_rows: usize,
    pub has_header: bool,
    pub skip_data_rows: usize,
}

/// A table produced by applying a [`TableSchema`] to raw rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Returns the values of the given named column.
    pub fn column(&self, name: &str) -> Vec<&str> {
        let Some(index) = self.columns.iter().position(|column| column == name) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row.get(index).map(String::as_str))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TableSchema {
    /// Selects the configured columns out of `raw` rows.
    ///
    /// Blank rows (rows without any cell) count towards `skip_rows` and are
    /// dropped everywhere else. Short rows are padded with empty cells, but a
    /// row wider than the header, or than the first row when there is no
    /// header, makes the input malformed. So does a selected column that is
    /// reached by neither the header nor any data row.
    pub fn apply(&self, raw: Vec<Vec<String>>, source_name: &str) -> Result<Table> {
        let widest = self.columns.iter().copied().max().unwrap_or(0);
        let mut rows = raw
            .into_iter()
            .enumerate()
            .skip(self.skip_rows)
            .filter(|(_, row)| !row.is_empty());

        let mut width = None;
        if self.has_header {
            let (_, header) = rows.next().ok_or_else(|| ReportError::empty(source_name))?;
            if header.len() <= widest {
                return Err(ReportError::malformed(
                    source_name,
                    format!(
                        "header has {} column(s), column {widest} is required",
                        header.len()
                    ),
                ));
            }
            width = Some(header.len());
        }

        let mut data: Vec<Vec<String>> = Vec::new();
        for (idx, row) in rows {
            let expected = *width.get_or_insert(row.len());
            if row.len() > expected {
                return Err(ReportError::malformed(
                    source_name,
                    format!(
                        "expected {expected} fields in line {}, saw {}",
                        idx + 1,
                        row.len()
                    ),
                ));
            }
            data.push(row);
        }

        let data: Vec<Vec<String>> = data.into_iter().skip(self.skip_data_rows).collect();
        if !data.is_empty() && data.iter().all(|row| row.len() <= widest) {
            return Err(ReportError::malformed(
                source_name,
                format!("column {widest} is not present in any data row"),
            ));
        }

        let rows = data
            .into_iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|&idx| row.get(idx).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(Table {
            columns: self.names.clone(),
            rows,
        })
    }
}

/// Location of the device list inside the roster file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterSchema {
    pub device_column: usize,
    pub has_header: bool,
    /// Label rows following the header that carry no device.
    pub skip_data_rows: usize,
}

impl Default for RosterSchema {
    fn default() -> Self {
        Self {
            device_column: 0,
            has_header: true,
            skip_data_rows: 1,
        }
    }
}

impl RosterSchema {
    pub fn table_schema(&self) -> TableSchema {
        TableSchema {
            columns: vec![self.device_column],
            names: vec![DEVICE_NAME_COLUMN.to_string()],
            skip_rows: 0,
            has_header: self.has_header,
            skip_data_rows: self.skip_data_rows,
        }
    }
}

/// Location of the submissions and the meeting timestamp inside the poll
/// export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSchema {
    pub device_column: usize,
    pub timestamp_column: usize,
    pub attendance_column: usize,
    /// Metadata rows preceding the first submission.
    pub skip_rows: usize,
}

impl Default for PollSchema {
    fn default() -> Self {
        Self {
            device_column: 1,
            timestamp_column: 3,
            attendance_column: 4,
            skip_rows: 10,
        }
    }
}

impl PollSchema {
    pub fn attendance_schema(&self) -> TableSchema {
        TableSchema {
            columns: vec![self.device_column, self.attendance_column],
            names: vec![
                DEVICE_NAME_COLUMN.to_string(),
                ATTENDANCE_COLUMN.to_string(),
            ],
            skip_rows: self.skip_rows,
            has_header: false,
            skip_data_rows: 0,
        }
    }

    pub fn timestamp_schema(&self) -> TableSchema {
        TableSchema {
            columns: vec![self.timestamp_column],
            names: vec![TIMESTAMP_COLUMN.to_string()],
            skip_rows: self.skip_rows,
            has_header: false,
            skip_data_rows: 0,
        }
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub roster: RosterSchema,
    pub poll: PollSchema,
    /// Attendance answers that count as zero regardless of their text.
    pub submitted_sentinels: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roster: RosterSchema::default(),
            poll: PollSchema::default(),
            submitted_sentinels: vec![ALREADY_SUBMITTED.to_string()],
        }
    }
}

impl Config {
    /// Loads a configuration file. Missing fields keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReportError::MissingInput(path.to_path_buf()));
        }
        let data = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&data)?;
        debug!(?config, path = %path.display(), "loaded schema configuration");
        Ok(config)
    }
}
