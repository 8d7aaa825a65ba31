use std::collections::BTreeSet;

use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::io::{self, Input};
use crate::model::{AttendanceRecord, DeviceName};
use crate::schema::{
    ATTENDANCE_COLUMN, DEVICE_NAME_COLUMN, PollSchema, RosterSchema, TIMESTAMP_COLUMN,
};

/// Loads the set of expected devices from the roster (File A). Blank cells
/// are dropped and duplicates collapse.
#[instrument(level = "info", skip_all, fields(source = input.name))]
pub fn load_roster(input: &Input<'_>, schema: &RosterSchema) -> Result<BTreeSet<DeviceName>> {
    let table = io::read_table(input, &schema.table_schema())?;
    let roster: BTreeSet<DeviceName> = table
        .column(DEVICE_NAME_COLUMN)
        .into_iter()
        .filter(|device| !device.trim().is_empty())
        .map(str::to_string)
        .collect();
    info!(
        rows = table.rows.len(),
        roster_count = roster.len(),
        "loaded roster"
    );
    Ok(roster)
}

/// Loads every submission row of the poll export (File B).
#[instrument(level = "info", skip_all, fields(source = input.name))]
pub fn load_attendance(input: &Input<'_>, schema: &PollSchema) -> Result<Vec<AttendanceRecord>> {
    let table = io::read_table(input, &schema.attendance_schema())?;
    if table.is_empty() {
        warn!("poll export holds no submissions");
    }
    let records: Vec<AttendanceRecord> = table
        .column(DEVICE_NAME_COLUMN)
        .into_iter()
        .zip(table.column(ATTENDANCE_COLUMN))
        .map(|(device, value)| AttendanceRecord::new(device, value))
        .collect();
    info!(record_count = records.len(), "loaded poll submissions");
    Ok(records)
}

/// Reads the raw meeting timestamp from the first submission row of the
/// poll export. Returns `None` when there is no such row or the cell is
/// blank.
#[instrument(level = "debug", skip_all, fields(source = input.name))]
pub fn load_meeting_timestamp(input: &Input<'_>, schema: &PollSchema) -> Result<Option<String>> {
    let table = io::read_table(input, &schema.timestamp_schema())?;
    let timestamp = table
        .column(TIMESTAMP_COLUMN)
        .first()
        .filter(|cell| !cell.trim().is_empty())
        .map(|cell| cell.to_string());
    debug!(?timestamp, "meeting timestamp cell");
    Ok(timestamp)
}
