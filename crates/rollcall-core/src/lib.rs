//! # Rollcall Core Library
//!
//! This library provides the engagement ledger behind the `rollcall` CLI:
//! punctuality scoring, a points ledger with redemptions, leaderboards,
//! absence detection and a per-date meeting agenda. Every operation is
//! exposed here first; the CLI is a thin layer over the same calls.
//!
//! ## Architecture
//!
//! - **Engine**: pure, in-memory views ([`Ledger`], [`Roster`], [`Agenda`])
//!   and free functions over record slices. Everything that depends on the
//!   clock takes the instant as an argument, generic over the timezone.
//! - **Storage**: SQLite record store and TOML configuration
//!   ([`Database`], [`Config`]), plus JSON snapshots for backup.
//!
//! ## Key Components
//!
//! - [`score_points`]: arrival time to points and status
//! - [`Ledger`]: attendance and redemption logs with derived balances
//! - [`leaderboard`]: ranked point totals for a period
//! - [`absentees`]: consecutive-miss detection for follow-up
//! - [`active_segment`]: the agenda segment running right now

pub mod agenda;
pub mod error;
pub mod follow_up;
pub mod ledger;
pub mod picker;
pub mod rewards;
pub mod roster;
pub mod scoring;
pub mod stats;
pub mod storage;
pub mod time;

pub use agenda::{active_segment, Agenda, MeetingSegment};
pub use error::{ConfigError, CoreError, DatabaseError, LedgerError, ValidationError};
pub use follow_up::{last_contact, FollowUpLog, InteractionKind};
pub use ledger::{
    AttendanceRecord, CheckIn, CheckInMethod, Ledger, MemberBalance, PointsBalance,
    RedemptionRecord,
};
pub use picker::{pick_present, present_members};
pub use rewards::{GiftCatalog, GiftItem};
pub use roster::{Member, Roster, ServantFilter};
pub use scoring::{score_points, ArrivalStatus, MeetingConfig, Score};
pub use stats::{
    absentees, attendance_counts, consecutive_misses, leaderboard, meeting_dates, AbsenceQuery,
    Absentee, DailyAttendance, FollowUpConfig, LeaderboardConfig, LeaderboardEntry, Period,
};
pub use storage::{Config, Database, FlatMeetingConfig, Snapshot, SnapshotConfig};
