//! Merges the roster with the platform submissions.
//!
//! Every device seen in the export keeps its best attendance value and is
//! tagged [`Category::Polls`]; roster devices that never submitted are
//! appended as [`Category::NotEntered`] with zero attendance.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::model::{AttendanceRecord, Category, DeviceName, ReportRow};
use crate::schema::ALREADY_SUBMITTED;

/// Outcome of reconciling the two sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    /// Polls rows sorted by device, then Not_Entered rows sorted by device.
    pub rows: Vec<ReportRow>,
    pub zoom_total: f64,
}

impl Reconciliation {
    pub fn rows_in(&self, category: Category) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(move |row| row.category == category)
    }
}

/// Reconciler carrying the attendance answers that are treated as zero.
#[derive(Debug, Clone)]
pub struct Reconciler {
    sentinels: Vec<String>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(vec![ALREADY_SUBMITTED.to_string()])
    }
}

impl Reconciler {
    pub fn new(sentinels: Vec<String>) -> Self {
        Self { sentinels }
    }

    /// Turns a raw attendance cell into a non-negative count.
    ///
    /// Sentinel answers, blanks, text and negative or non-finite numbers all
    /// count as zero. This never fails.
    pub fn coerce(&self, raw: &str) -> f64 {
        let trimmed = raw.trim();
        if self.sentinels.iter().any(|sentinel| sentinel.trim() == trimmed) {
            return 0.0;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => value,
            _ => 0.0,
        }
    }

    #[instrument(
        level = "info",
        skip_all,
        fields(roster_count = roster.len(), record_count = records.len())
    )]
    pub fn reconcile(
        &self,
        roster: &BTreeSet<DeviceName>,
        records: &[AttendanceRecord],
    ) -> Reconciliation {
        let mut best: BTreeMap<&str, f64> = BTreeMap::new();
        for record in records {
            let device = record.device_name.as_str();
            if device.trim().is_empty() {
                continue;
            }
            let value = self.coerce(&record.attendance_value);
            best.entry(device)
                .and_modify(|current| *current = current.max(value))
                .or_insert(value);
        }

        let mut rows: Vec<ReportRow> = best
            .iter()
            .map(|(device, value)| ReportRow::polls(*device, *value))
            .collect();

        let missing: Vec<&DeviceName> = roster
            .iter()
            .filter(|device| !best.contains_key(device.as_str()))
            .collect();
        rows.extend(missing.iter().map(|device| ReportRow::not_entered(device.as_str())));

        let zoom_total: f64 = rows.iter().map(|row| row.attendance).sum();
        debug!(
            polls = best.len(),
            not_entered = missing.len(),
            zoom_total,
            "reconciled attendance"
        );

        Reconciliation { rows, zoom_total }
    }
}

/// Reconciles with the default sentinel list.
pub fn reconcile(roster: &BTreeSet<DeviceName>, records: &[AttendanceRecord]) -> Reconciliation {
    Reconciler::default().reconcile(roster, records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(devices: &[&str]) -> BTreeSet<DeviceName> {
        devices.iter().map(|device| device.to_string()).collect()
    }

    fn record(device: &str, value: &str) -> AttendanceRecord {
        AttendanceRecord::new(device, value)
    }

    fn summary(result: &Reconciliation) -> Vec<(String, f64, Category)> {
        result
            .rows
            .iter()
            .map(|row| (row.device_name.clone(), row.attendance, row.category))
            .collect()
    }

    #[test]
    fn scenario_with_duplicates_and_missing_device() {
        let result = reconcile(
            &roster(&["A", "B", "C"]),
            &[record("A", "3"), record("A", "7"), record("B", "2")],
        );

        assert_eq!(
            summary(&result),
            vec![
                ("A".to_string(), 7.0, Category::Polls),
                ("B".to_string(), 2.0, Category::Polls),
                ("C".to_string(), 0.0, Category::NotEntered),
            ]
        );
        assert_eq!(result.zoom_total, 9.0);
    }

    #[test]
    fn duplicate_submissions_keep_the_maximum() {
        let result = reconcile(
            &roster(&[]),
            &[record("X", "2"), record("X", "5"), record("X", "1")],
        );
        assert_eq!(result.rows, vec![ReportRow::polls("X", 5.0)]);
    }

    #[test]
    fn sentinel_and_garbage_coerce_to_zero() {
        let reconciler = Reconciler::default();
        assert_eq!(reconciler.coerce(ALREADY_SUBMITTED), 0.0);
        assert_eq!(reconciler.coerce(&format!(" {ALREADY_SUBMITTED} ")), 0.0);
        assert_eq!(reconciler.coerce("yes"), 0.0);
        assert_eq!(reconciler.coerce(""), 0.0);
        assert_eq!(reconciler.coerce("-4"), 0.0);
        assert_eq!(reconciler.coerce("NaN"), 0.0);
        assert_eq!(reconciler.coerce(" 6 "), 6.0);
        assert_eq!(reconciler.coerce("2.5"), 2.5);
    }

    #[test]
    fn custom_sentinels_replace_the_default() {
        let reconciler = Reconciler::new(vec!["99".to_string()]);
        assert_eq!(reconciler.coerce("99"), 0.0);
        assert_eq!(reconciler.coerce("5"), 5.0);
    }

    #[test]
    fn sentinel_answer_still_counts_as_polled() {
        let result = reconcile(&roster(&["A"]), &[record("A", ALREADY_SUBMITTED)]);
        assert_eq!(result.rows, vec![ReportRow::polls("A", 0.0)]);
        assert_eq!(result.rows_in(Category::NotEntered).count(), 0);
    }

    #[test]
    fn every_device_appears_exactly_once() {
        let roster = roster(&["D", "A", "C", "A"]);
        let records = [record("B", "1"), record("A", "2"), record("E", "x"), record("B", "4")];
        let result = reconcile(&roster, &records);

        let names: Vec<&str> = result.rows.iter().map(|row| row.device_name.as_str()).collect();
        let unique: BTreeSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
        assert_eq!(unique, BTreeSet::from(["A", "B", "C", "D", "E"]));
        assert_eq!(names, vec!["A", "B", "E", "C", "D"]);
        assert_eq!(
            result.zoom_total,
            result.rows.iter().map(|row| row.attendance).sum::<f64>()
        );
    }

    #[test]
    fn no_submissions_marks_whole_roster_missing() {
        let result = reconcile(&roster(&["B", "A"]), &[]);
        assert!(result.rows.iter().all(|row| row.category == Category::NotEntered));
        assert!(result.rows.iter().all(|row| row.attendance == 0.0));
        assert_eq!(result.zoom_total, 0.0);
    }

    #[test]
    fn blank_device_names_are_ignored() {
        let result = reconcile(&roster(&[]), &[record("", "3"), record("  ", "4")]);
        assert!(result.rows.is_empty());
        assert_eq!(result.zoom_total, 0.0);
    }
}
