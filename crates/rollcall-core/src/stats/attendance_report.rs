//! Per-meeting attendance counts for reports.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::AttendanceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAttendance {
    pub date: NaiveDate,
    pub count: usize,
}

/// Check-in counts for the `last_n` most recent meeting dates, oldest
/// first.
pub fn attendance_counts(records: &[AttendanceRecord], last_n: usize) -> Vec<DailyAttendance> {
    let mut by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        *by_date.entry(record.date_str).or_insert(0) += 1;
    }
    let skip = by_date.len().saturating_sub(last_n);
    by_date
        .into_iter()
        .skip(skip)
        .map(|(date, count)| DailyAttendance { date, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::CheckInMethod;

    fn record(member_id: &str, day: u32) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("{member_id}-{day}"),
            member_id: member_id.to_string(),
            timestamp: 0,
            date_str: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            points: 10,
            method: CheckInMethod::Fingerprint,
        }
    }

    #[test]
    fn keeps_most_recent_dates_in_ascending_order() {
        let records = vec![
            record("a", 20),
            record("a", 6),
            record("b", 20),
            record("a", 13),
            record("c", 27),
        ];
        let counts = attendance_counts(&records, 3);
        let summary: Vec<(u32, usize)> = counts
            .iter()
            .map(|d| (chrono::Datelike::day(&d.date), d.count))
            .collect();
        assert_eq!(summary, vec![(13, 1), (20, 2), (27, 1)]);
    }

    #[test]
    fn fewer_dates_than_requested() {
        assert_eq!(attendance_counts(&[record("a", 6)], 5).len(), 1);
        assert!(attendance_counts(&[], 5).is_empty());
    }
}
