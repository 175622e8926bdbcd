//! Read-only views over the ledger.
//!
//! Everything here is a pure function of the attendance log, the roster
//! and the caller's notion of "now"; nothing is cached between calls.

mod absence;
mod attendance_report;
mod leaderboard;

pub use absence::{
    absentees, consecutive_misses, meeting_dates, Absentee, AbsenceQuery, FollowUpConfig,
};
pub use attendance_report::{attendance_counts, DailyAttendance};
pub use leaderboard::{leaderboard, LeaderboardConfig, LeaderboardEntry, Period};
