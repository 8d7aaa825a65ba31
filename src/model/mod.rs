use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a participant device. It is the join key between the
/// roster and the platform export and keeps its plain string form so it
/// survives the trip into Excel untouched.
pub type DeviceName = String;

/// One attendance submission as it appears in the platform export.
///
/// The value is kept as the raw cell text; turning it into a number is the
/// reconciler's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub device_name: DeviceName,
    pub attendance_value: String,
}

impl AttendanceRecord {
    pub fn new(device_name: impl Into<DeviceName>, attendance_value: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            attendance_value: attendance_value.into(),
        }
    }
}

/// Classification of a row in the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// The device submitted at least one poll answer.
    #[serde(rename = "Polls")]
    Polls,
    /// The device is on the roster but never appeared in the export.
    #[serde(rename = "Not_Entered")]
    NotEntered,
}

impl Category {
    /// Label written to the report.
    pub fn label(self) -> &'static str {
        match self {
            Category::Polls => "Polls",
            Category::NotEntered => "Not_Entered",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single line of the consolidated attendance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub device_name: DeviceName,
    pub attendance: f64,
    pub category: Category,
}

impl ReportRow {
    pub fn polls(device_name: impl Into<DeviceName>, attendance: f64) -> Self {
        Self {
            device_name: device_name.into(),
            attendance,
            category: Category::Polls,
        }
    }

    pub fn not_entered(device_name: impl Into<DeviceName>) -> Self {
        Self {
            device_name: device_name.into(),
            attendance: 0.0,
            category: Category::NotEntered,
        }
    }
}

/// Headcounts shown in the summary block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of attendance over every row of the final report.
    pub zoom_total: f64,
    /// Manually supplied count of people attending in the room.
    pub in_person: u32,
    /// `zoom_total + in_person`.
    pub grand_total: f64,
}

impl Totals {
    pub fn new(zoom_total: f64, in_person: u32) -> Self {
        Self {
            zoom_total,
            in_person,
            grand_total: zoom_total + f64::from(in_person),
        }
    }
}

/// One labelled line of the summary block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub count: f64,
}

impl SummaryRow {
    pub fn new(label: impl Into<String>, count: f64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}
