//! Arrival scoring rule.
//!
//! Converts an arrival instant into reward points by comparing its local
//! time of day against the configured meeting start:
//!
//! | Minutes after start | Status          | Points           |
//! |---------------------|-----------------|------------------|
//! | ≤ 0                 | on time / early | `points_on_time` |
//! | 1 – 15              | slightly late   | `points_late_15` |
//! | 16 – 30             | moderately late | `points_late_30` |
//! | > 30                | very late       | `points_late`    |
//!
//! Boundaries resolve toward the better tier. Seconds are ignored, so an
//! arrival at 18:00:59 for an 18:00 start is on time.

use chrono::{DateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::time::{hhmm, minute_of_day};

/// Meeting start time and the four point tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingConfig {
    #[serde(with = "hhmm", default = "default_start_time")]
    pub start_time: NaiveTime,
    #[serde(default = "default_points_on_time")]
    pub points_on_time: i64,
    #[serde(default = "default_points_late_15")]
    pub points_late_15: i64,
    #[serde(default = "default_points_late_30")]
    pub points_late_30: i64,
    #[serde(default = "default_points_late")]
    pub points_late: i64,
}

fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN)
}
fn default_points_on_time() -> i64 {
    10
}
fn default_points_late_15() -> i64 {
    7
}
fn default_points_late_30() -> i64 {
    4
}
fn default_points_late() -> i64 {
    1
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            points_on_time: default_points_on_time(),
            points_late_15: default_points_late_15(),
            points_late_30: default_points_late_30(),
            points_late: default_points_late(),
        }
    }
}

impl MeetingConfig {
    /// Check the tier monotonicity invariant.
    ///
    /// Scoring itself never validates; this runs when the configuration is
    /// saved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tiers = [
            ("meeting.points_on_time", self.points_on_time),
            ("meeting.points_late_15", self.points_late_15),
            ("meeting.points_late_30", self.points_late_30),
            ("meeting.points_late", self.points_late),
        ];
        if let Some((key, value)) = tiers.iter().find(|(_, v)| *v < 0) {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("points must not be negative (got {value})"),
            });
        }
        for pair in tiers.windows(2) {
            let (better_key, better) = pair[0];
            let (worse_key, worse) = pair[1];
            if better < worse {
                return Err(ConfigError::InvalidValue {
                    key: worse_key.to_string(),
                    message: format!(
                        "tiers must not increase with lateness: {better_key} = {better} < {worse}"
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Punctuality tier of a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalStatus {
    OnTime,
    SlightlyLate,
    ModeratelyLate,
    VeryLate,
}

impl ArrivalStatus {
    /// Tier for a signed lateness in minutes.
    pub fn from_delta(delta_minutes: i64) -> Self {
        match delta_minutes {
            d if d <= 0 => ArrivalStatus::OnTime,
            d if d <= 15 => ArrivalStatus::SlightlyLate,
            d if d <= 30 => ArrivalStatus::ModeratelyLate,
            _ => ArrivalStatus::VeryLate,
        }
    }

    /// Human-readable label shown after a check-in.
    pub fn label(&self) -> &'static str {
        match self {
            ArrivalStatus::OnTime => "on time / early",
            ArrivalStatus::SlightlyLate => "slightly late",
            ArrivalStatus::ModeratelyLate => "moderately late",
            ArrivalStatus::VeryLate => "very late",
        }
    }

    /// Points this tier earns under `config`.
    pub fn points(&self, config: &MeetingConfig) -> i64 {
        match self {
            ArrivalStatus::OnTime => config.points_on_time,
            ArrivalStatus::SlightlyLate => config.points_late_15,
            ArrivalStatus::ModeratelyLate => config.points_late_30,
            ArrivalStatus::VeryLate => config.points_late,
        }
    }
}

impl std::fmt::Display for ArrivalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of scoring one arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub points: i64,
    pub status: ArrivalStatus,
    /// Minutes after the configured start (negative when early)
    pub delta_minutes: i64,
}

/// Minutes between the meeting start and the arrival's local time of day.
pub fn delta_minutes<Tz: TimeZone>(arrival: &DateTime<Tz>, config: &MeetingConfig) -> i64 {
    minute_of_day(arrival.time()) - minute_of_day(config.start_time)
}

/// Score an arrival. Pure; never fails.
pub fn score_points<Tz: TimeZone>(arrival: &DateTime<Tz>, config: &MeetingConfig) -> Score {
    let delta = delta_minutes(arrival, config);
    let status = ArrivalStatus::from_delta(delta);
    Score {
        points: status.points(config),
        status,
        delta_minutes: delta,
    }
}
