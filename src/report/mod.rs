use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{Result, ReportError};
use crate::model::{ReportRow, SummaryRow, Totals};
use crate::reconcile::Reconciliation;

/// Prefix of the title line written above the attendance table.
pub const TITLE_PREFIX: &str = "Report for the Meeting held on ";
/// Summary labels, in the order they are written.
pub const ON_ZOOM_LABEL: &str = "On Zoom";
pub const IN_PERSON_LABEL: &str = "In Person";
pub const TOTAL_LABEL: &str = "Total";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%b %d, %Y %I:%M:%S %p",
    "%b %d, %Y %I:%M %p",
    "%b %d, %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%b %d, %Y", "%d %b %Y"];

/// The composed report, ready to be rendered or exported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub meeting_date: NaiveDate,
    pub title: String,
    pub rows: Vec<ReportRow>,
    pub summary: Vec<SummaryRow>,
    pub totals: Totals,
}

impl Report {
    /// Name under which the spreadsheet is offered, `Output_<YYYY-MM-DD>.xlsx`.
    pub fn file_name(&self) -> String {
        format!("Output_{}.xlsx", format_date(self.meeting_date))
    }
}

/// Parses the meeting timestamp cell and assembles the report sections.
#[instrument(level = "info", skip(reconciliation), fields(row_count = reconciliation.rows.len()))]
pub fn compose(
    raw_timestamp: Option<&str>,
    reconciliation: Reconciliation,
    in_person: u32,
) -> Result<Report> {
    let raw = raw_timestamp
        .ok_or_else(|| ReportError::DateParse("File B has no meeting timestamp".to_string()))?;
    let meeting_date = parse_meeting_date(raw)?;
    let title = format!("{TITLE_PREFIX}{}", format_date(meeting_date));

    let totals = Totals::new(reconciliation.zoom_total, in_person);
    let summary = vec![
        SummaryRow::new(ON_ZOOM_LABEL, totals.zoom_total),
        SummaryRow::new(IN_PERSON_LABEL, f64::from(totals.in_person)),
        SummaryRow::new(TOTAL_LABEL, totals.grand_total),
    ];
    debug!(%meeting_date, grand_total = totals.grand_total, "composed report");

    Ok(Report {
        meeting_date,
        title,
        rows: reconciliation.rows,
        summary,
        totals,
    })
}

/// Extracts the calendar date from a timestamp in any of the common export
/// layouts. The time of day is discarded.
pub fn parse_meeting_date(raw: &str) -> Result<NaiveDate> {
    let value = raw.trim().trim_matches('"').trim();
    if value.is_empty() {
        return Err(ReportError::DateParse(
            "meeting timestamp cell is empty".to_string(),
        ));
    }

    if let Ok(moment) = DateTime::parse_from_rfc3339(value) {
        return Ok(moment.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(moment) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(moment.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }

    Err(ReportError::DateParse(format!(
        "unrecognised timestamp '{value}'"
    )))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn reconciliation() -> Reconciliation {
        Reconciliation {
            rows: vec![
                ReportRow::polls("A", 7.0),
                ReportRow::polls("B", 2.0),
                ReportRow::not_entered("C"),
            ],
            zoom_total: 9.0,
        }
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn title_and_file_name_share_the_meeting_date() {
        let report = compose(Some("2024-03-15 18:00:00"), reconciliation(), 4).unwrap();
        assert_eq!(report.title, "Report for the Meeting held on 2024-03-15");
        assert_eq!(report.file_name(), "Output_2024-03-15.xlsx");
        assert_eq!(report.rows[2].category, Category::NotEntered);
    }

    #[test]
    fn summary_rows_are_fixed_and_consistent() {
        let report = compose(Some("2024-03-15"), reconciliation(), 4).unwrap();
        assert_eq!(
            report.summary,
            vec![
                SummaryRow::new("On Zoom", 9.0),
                SummaryRow::new("In Person", 4.0),
                SummaryRow::new("Total", 13.0),
            ]
        );
        assert_eq!(report.totals.grand_total, report.totals.zoom_total + 4.0);
    }

    #[test]
    fn zero_in_person_keeps_zoom_total() {
        let report = compose(Some("2024-03-15"), reconciliation(), 0).unwrap();
        assert_eq!(report.totals.grand_total, report.totals.zoom_total);
    }

    #[test]
    fn accepts_common_export_layouts() {
        let expected = ymd(2024, 3, 15);
        for raw in [
            "2024-03-15 18:00:00",
            "2024-03-15T18:00:00",
            "2024-03-15T18:00:00+05:30",
            "2024-03-15 18:00:00.250",
            "2024-03-15 18:00",
            "\"2024-03-15 18:00:00\"",
            "03/15/2024 18:00",
            "03/15/2024 06:00:00 PM",
            "Mar 15, 2024 06:00:00 PM",
            "2024/03/15",
            "03/15/2024",
        ] {
            assert_eq!(parse_meeting_date(raw).unwrap(), expected, "parsing {raw}");
        }
    }

    #[test]
    fn missing_or_garbage_timestamp_is_fatal() {
        assert!(matches!(
            compose(None, reconciliation(), 1),
            Err(ReportError::DateParse(_))
        ));
        assert!(matches!(
            parse_meeting_date("  "),
            Err(ReportError::DateParse(_))
        ));
        assert!(matches!(
            parse_meeting_date("sometime last week"),
            Err(ReportError::DateParse(_))
        ));
    }
}
