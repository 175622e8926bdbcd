//! Earn- and spend-event records.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::local_date;

/// How a member was identified at check-in. Has no effect on scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInMethod {
    Face,
    Fingerprint,
    Manual,
}

impl CheckInMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInMethod::Face => "face",
            CheckInMethod::Fingerprint => "fingerprint",
            CheckInMethod::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "face" => Some(CheckInMethod::Face),
            "fingerprint" => Some(CheckInMethod::Fingerprint),
            "manual" => Some(CheckInMethod::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for CheckInMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Earn-event: one member present at one meeting.
///
/// `points` is fixed at creation and never recomputed, even if the
/// meeting configuration changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub member_id: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    /// Local calendar date of the meeting
    pub date_str: NaiveDate,
    pub points: i64,
    pub method: CheckInMethod,
}

impl AttendanceRecord {
    pub(crate) fn new<Tz: TimeZone>(
        member_id: &str,
        arrival: &DateTime<Tz>,
        points: i64,
        method: CheckInMethod,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            member_id: member_id.to_string(),
            timestamp: arrival.timestamp_millis(),
            date_str: local_date(arrival),
            points,
            method,
        }
    }
}

/// Spend-event: points exchanged for a gift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRecord {
    pub id: String,
    pub member_id: String,
    pub gift_name: String,
    pub points_cost: i64,
    /// Epoch milliseconds
    pub timestamp: i64,
    /// Who handed out the gift
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servant_name: Option<String>,
}
