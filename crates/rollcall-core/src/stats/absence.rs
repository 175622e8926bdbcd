//! Absence detection.
//!
//! A "meeting" is any date that appears in at least one attendance record,
//! so a meeting nobody attended is invisible here and never counts as a
//! miss. For each member the detector walks those dates from the most
//! recent backwards and counts misses until the first date the member
//! attended.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::AttendanceRecord;
use crate::roster::{Member, Roster, ServantFilter};

/// Follow-up thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpConfig {
    /// Meetings scanned for the dashboard alert card
    #[serde(default = "default_dashboard_lookback")]
    pub dashboard_lookback: usize,
    /// Misses before a member shows on the dashboard
    #[serde(default = "default_dashboard_threshold")]
    pub dashboard_threshold: usize,
    /// Maximum members on the dashboard card
    #[serde(default = "default_dashboard_limit")]
    pub dashboard_limit: usize,
    /// Meetings scanned on the follow-up page
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// Default miss threshold on the follow-up page
    #[serde(default = "default_weeks")]
    pub default_weeks: usize,
}

fn default_dashboard_lookback() -> usize {
    3
}
fn default_dashboard_threshold() -> usize {
    2
}
fn default_dashboard_limit() -> usize {
    5
}
fn default_lookback() -> usize {
    5
}
fn default_weeks() -> usize {
    2
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self {
            dashboard_lookback: default_dashboard_lookback(),
            dashboard_threshold: default_dashboard_threshold(),
            dashboard_limit: default_dashboard_limit(),
            lookback: default_lookback(),
            default_weeks: default_weeks(),
        }
    }
}

/// Parameters of one absentee scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceQuery {
    /// Local date treated as "today"
    pub today: NaiveDate,
    /// Minimum consecutive misses to report
    pub threshold: usize,
    /// Number of most recent meeting dates to scan; `None` scans all
    pub lookback: Option<usize>,
    /// Maximum rows returned
    pub limit: Option<usize>,
    pub servant: ServantFilter,
}

impl AbsenceQuery {
    pub fn new(today: NaiveDate, threshold: usize) -> Self {
        Self {
            today,
            threshold,
            lookback: None,
            limit: None,
            servant: ServantFilter::All,
        }
    }

    /// The dashboard's "recently missed" card.
    pub fn dashboard(today: NaiveDate, config: &FollowUpConfig) -> Self {
        Self {
            lookback: Some(config.dashboard_lookback),
            limit: Some(config.dashboard_limit),
            ..Self::new(today, config.dashboard_threshold)
        }
    }

    /// The follow-up page, reporting members with at least `weeks` misses.
    pub fn follow_up(today: NaiveDate, weeks: usize, config: &FollowUpConfig) -> Self {
        Self {
            lookback: Some(config.lookback),
            ..Self::new(today, weeks)
        }
    }

    pub fn with_servant(mut self, servant: ServantFilter) -> Self {
        self.servant = servant;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Absentee<'a> {
    pub member: &'a Member,
    pub consecutive_misses: usize,
    /// The attended date that ended the streak, if inside the window
    pub last_attended: Option<NaiveDate>,
}

/// Distinct meeting dates, most recent first.
pub fn meeting_dates(records: &[AttendanceRecord]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = records
        .iter()
        .map(|r| r.date_str)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates
}

/// Set of `(member, date)` pairs with an attendance record.
fn attended_pairs(records: &[AttendanceRecord]) -> HashSet<(&str, NaiveDate)> {
    records
        .iter()
        .map(|r| (r.member_id.as_str(), r.date_str))
        .collect()
}

/// Walk `dates` (most recent first) and count misses until the member's
/// first attended date, which is returned alongside the count.
fn walk_streak(
    attended: &HashSet<(&str, NaiveDate)>,
    member_id: &str,
    dates: &[NaiveDate],
) -> (usize, Option<NaiveDate>) {
    let mut misses = 0;
    for date in dates {
        if attended.contains(&(member_id, *date)) {
            return (misses, Some(*date));
        }
        misses += 1;
    }
    (misses, None)
}

/// Consecutive misses ending at the most recent meeting date.
pub fn consecutive_misses(records: &[AttendanceRecord], member_id: &str) -> usize {
    let attended = attended_pairs(records);
    walk_streak(&attended, member_id, &meeting_dates(records)).0
}

/// Members whose current miss streak reaches the query threshold, longest
/// streak first. Members already present today are skipped; equal streaks
/// keep roster order.
pub fn absentees<'a>(
    records: &[AttendanceRecord],
    roster: &'a Roster,
    query: &AbsenceQuery,
) -> Vec<Absentee<'a>> {
    let mut dates = meeting_dates(records);
    if let Some(lookback) = query.lookback {
        dates.truncate(lookback);
    }
    if dates.is_empty() {
        return Vec::new();
    }

    let attended = attended_pairs(records);
    let mut result: Vec<Absentee<'a>> = roster
        .assigned_to(&query.servant)
        .filter(|m| !attended.contains(&(m.id.as_str(), query.today)))
        .filter_map(|member| {
            let (misses, last_attended) = walk_streak(&attended, &member.id, &dates);
            (misses >= query.threshold).then_some(Absentee {
                member,
                consecutive_misses: misses,
                last_attended,
            })
        })
        .collect();

    result.sort_by(|a, b| b.consecutive_misses.cmp(&a.consecutive_misses));
    if let Some(limit) = query.limit {
        result.truncate(limit);
    }

    tracing::debug!(
        scanned_dates = dates.len(),
        threshold = query.threshold,
        flagged = result.len(),
        "absentees computed"
    );
    result
}
