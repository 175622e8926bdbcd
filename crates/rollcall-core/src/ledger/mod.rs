//! Points ledger.
//!
//! Two append-only logs: attendance (earn) and redemptions (spend). A
//! member's balance is always derived from the logs on read and is never
//! stored, so deleting either kind of record needs no compensating write.
//!
//! The ledger takes `&mut self` for every write; a host sharing one ledger
//! across threads must wrap it in a lock so the duplicate and balance
//! checks stay atomic with the append.

mod records;

pub use records::{AttendanceRecord, CheckInMethod, RedemptionRecord};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::roster::{Member, Roster};
use crate::scoring::{score_points, MeetingConfig, Score};
use crate::time::local_date;

/// Earned, spent and current points for one member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsBalance {
    pub earned: i64,
    pub spent: i64,
    pub current: i64,
}

/// A roster member paired with their balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberBalance<'a> {
    pub member: &'a Member,
    #[serde(flatten)]
    pub balance: PointsBalance,
}

/// Result of a successful check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckIn {
    pub record: AttendanceRecord,
    pub score: Score,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    attendance: Vec<AttendanceRecord>,
    redemptions: Vec<RedemptionRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from stored records, in stored order.
    pub fn from_records(
        attendance: Vec<AttendanceRecord>,
        redemptions: Vec<RedemptionRecord>,
    ) -> Self {
        Self {
            attendance,
            redemptions,
        }
    }

    pub fn attendance(&self) -> &[AttendanceRecord] {
        &self.attendance
    }

    pub fn redemptions(&self) -> &[RedemptionRecord] {
        &self.redemptions
    }

    /// Whether the member already has a record for `date`.
    pub fn has_checked_in(&self, member_id: &str, date: NaiveDate) -> bool {
        self.attendance
            .iter()
            .any(|r| r.member_id == member_id && r.date_str == date)
    }

    /// Score an arrival and append it as an attendance record.
    ///
    /// The meeting date is the local calendar date of `arrival`. Fails with
    /// `DuplicateCheckIn` when the member already has a record for it.
    pub fn record_attendance<Tz: TimeZone>(
        &mut self,
        member_id: &str,
        arrival: &DateTime<Tz>,
        method: CheckInMethod,
        config: &MeetingConfig,
    ) -> Result<CheckIn, LedgerError> {
        let date = local_date(arrival);
        if self.has_checked_in(member_id, date) {
            return Err(LedgerError::DuplicateCheckIn {
                member_id: member_id.to_string(),
                date,
            });
        }

        let score = score_points(arrival, config);
        let record = AttendanceRecord::new(member_id, arrival, score.points, method);
        tracing::info!(
            member_id,
            %date,
            points = score.points,
            status = score.status.label(),
            %method,
            "attendance recorded"
        );
        self.attendance.push(record.clone());
        Ok(CheckIn { record, score })
    }

    /// Spend points on a gift.
    ///
    /// Fails with `InvalidAmount` for a non-positive cost and with
    /// `InsufficientBalance` when the cost exceeds the current balance; the
    /// ledger is unchanged on failure.
    pub fn record_redemption(
        &mut self,
        member_id: &str,
        gift_name: &str,
        points_cost: i64,
        servant_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<RedemptionRecord, LedgerError> {
        if points_cost <= 0 {
            return Err(LedgerError::InvalidAmount {
                amount: points_cost,
            });
        }
        let balance = self.current_balance(member_id);
        if points_cost > balance {
            return Err(LedgerError::InsufficientBalance {
                member_id: member_id.to_string(),
                balance,
                requested: points_cost,
            });
        }

        let record = RedemptionRecord {
            id: Uuid::new_v4().to_string(),
            member_id: member_id.to_string(),
            gift_name: gift_name.to_string(),
            points_cost,
            timestamp: at.timestamp_millis(),
            servant_name: servant_name.map(str::to_string),
        };
        tracing::info!(
            member_id,
            gift = gift_name,
            points_cost,
            remaining = balance - points_cost,
            "redemption recorded"
        );
        self.redemptions.push(record.clone());
        Ok(record)
    }

    /// Remove an attendance record. Returns it if it existed.
    ///
    /// This can leave a balance below zero when the removed points were
    /// already spent.
    pub fn delete_attendance(&mut self, id: &str) -> Option<AttendanceRecord> {
        let index = self.attendance.iter().position(|r| r.id == id)?;
        let removed = self.attendance.remove(index);
        tracing::info!(id, member_id = %removed.member_id, "attendance deleted");
        Some(removed)
    }

    /// Remove a redemption; its cost flows back into the derived balance.
    pub fn delete_redemption(&mut self, id: &str) -> Option<RedemptionRecord> {
        let index = self.redemptions.iter().position(|r| r.id == id)?;
        let removed = self.redemptions.remove(index);
        tracing::info!(id, member_id = %removed.member_id, refunded = removed.points_cost, "redemption deleted");
        Some(removed)
    }

    pub fn balance(&self, member_id: &str) -> PointsBalance {
        let earned = self
            .attendance
            .iter()
            .filter(|r| r.member_id == member_id)
            .map(|r| r.points)
            .sum();
        let spent = self
            .redemptions
            .iter()
            .filter(|r| r.member_id == member_id)
            .map(|r| r.points_cost)
            .sum();
        PointsBalance {
            earned,
            spent,
            current: earned - spent,
        }
    }

    /// `Σ earned − Σ spent` for the member.
    pub fn current_balance(&self, member_id: &str) -> i64 {
        self.balance(member_id).current
    }

    /// Every roster member with their balance, highest current balance
    /// first. Ties keep roster order.
    pub fn balances<'a>(&self, roster: &'a Roster) -> Vec<MemberBalance<'a>> {
        let mut rows: Vec<MemberBalance<'a>> = roster
            .members()
            .iter()
            .map(|member| MemberBalance {
                member,
                balance: self.balance(&member.id),
            })
            .collect();
        rows.sort_by(|a, b| b.balance.current.cmp(&a.balance.current));
        rows
    }

    /// Records for one meeting date, in check-in order.
    pub fn attendance_on(&self, date: NaiveDate) -> Vec<&AttendanceRecord> {
        self.attendance.iter().filter(|r| r.date_str == date).collect()
    }

    /// A member's attendance, newest first.
    pub fn history(&self, member_id: &str) -> Vec<&AttendanceRecord> {
        let mut records: Vec<&AttendanceRecord> = self
            .attendance
            .iter()
            .filter(|r| r.member_id == member_id)
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    /// A member's redemptions, newest first.
    pub fn redemptions_for(&self, member_id: &str) -> Vec<&RedemptionRecord> {
        let mut records: Vec<&RedemptionRecord> = self
            .redemptions
            .iter()
            .filter(|r| r.member_id == member_id)
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }
}
