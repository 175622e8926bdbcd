//! Points leaderboard over earned points.
//!
//! Redemptions are ignored: the leaderboard ranks what members earned, not
//! what they still hold.

use chrono::{DateTime, Datelike, TimeZone};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ledger::AttendanceRecord;
use crate::roster::{Member, Roster};
use crate::time::from_millis;

/// Time window a leaderboard covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Current local calendar month
    #[default]
    Month,
    /// All recorded history
    All,
}

impl Period {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "month" => Some(Period::Month),
            "all" => Some(Period::All),
            _ => None,
        }
    }
}

/// Leaderboard defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub period: Period,
}

fn default_top_n() -> usize {
    10
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            period: Period::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry<'a> {
    pub member: &'a Member,
    pub points: i64,
}

/// Rank members by points earned in `period`, relative to `now`.
///
/// Month membership is judged in `now`'s time zone. Members missing from
/// the roster are dropped. Ties keep the order in which each member first
/// appears in `records`.
pub fn leaderboard<'a, Tz: TimeZone>(
    records: &[AttendanceRecord],
    roster: &'a Roster,
    period: Period,
    now: &DateTime<Tz>,
    top_n: usize,
) -> Vec<LeaderboardEntry<'a>> {
    let tz = now.timezone();
    let in_period = |record: &AttendanceRecord| match period {
        Period::All => true,
        Period::Month => from_millis(&tz, record.timestamp)
            .map(|at| at.year() == now.year() && at.month() == now.month())
            .unwrap_or(false),
    };

    let mut totals: IndexMap<&str, i64> = IndexMap::new();
    for record in records.iter().filter(|r| in_period(*r)) {
        *totals.entry(record.member_id.as_str()).or_insert(0) += record.points;
    }

    let mut entries: Vec<LeaderboardEntry<'a>> = totals
        .into_iter()
        .filter_map(|(id, points)| roster.get(id).map(|member| LeaderboardEntry { member, points }))
        .collect();
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    entries.truncate(top_n);

    tracing::debug!(?period, top_n, ranked = entries.len(), "leaderboard computed");
    entries
}
