//! JSON backup and restore.
//!
//! A snapshot carries every collection as an optional field so a partial
//! backup restores only what it contains.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::{Config, Database};
use crate::agenda::MeetingSegment;
use crate::error::{CoreError, DatabaseError};
use crate::follow_up::FollowUpLog;
use crate::ledger::{AttendanceRecord, RedemptionRecord};
use crate::rewards::GiftItem;
use crate::roster::Member;
use crate::scoring::MeetingConfig;
use crate::time::hhmm;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Member>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance: Option<Vec<AttendanceRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redemptions: Option<Vec<RedemptionRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gifts: Option<Vec<GiftItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<Vec<FollowUpLog>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SnapshotConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agenda: Option<Vec<MeetingSegment>>,
}

/// Config section of a backup.
///
/// Exports from this tool carry the whole [`Config`]. Exports from the
/// older web app carry only the meeting settings as a flat camelCase
/// object; those replace `meeting` and keep every other section as it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotConfig {
    Meeting(FlatMeetingConfig),
    Full(Config),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatMeetingConfig {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub points_on_time: i64,
    pub points_late_15: i64,
    pub points_late_30: i64,
    pub points_late: i64,
}

impl SnapshotConfig {
    /// The config to adopt, given the one currently in use.
    pub fn resolve(&self, current: &Config) -> Config {
        match self {
            SnapshotConfig::Full(config) => config.clone(),
            SnapshotConfig::Meeting(flat) => Config {
                meeting: MeetingConfig {
                    start_time: flat.start_time,
                    points_on_time: flat.points_on_time,
                    points_late_15: flat.points_late_15,
                    points_late_30: flat.points_late_30,
                    points_late: flat.points_late,
                },
                ..current.clone()
            },
        }
    }
}

impl Database {
    /// Capture every stored collection plus `config`.
    pub fn export_snapshot(&self, config: &Config) -> Result<Snapshot, DatabaseError> {
        let ledger = self.load_ledger()?;
        Ok(Snapshot {
            members: Some(self.load_roster()?.members().to_vec()),
            attendance: Some(ledger.attendance().to_vec()),
            redemptions: Some(ledger.redemptions().to_vec()),
            gifts: Some(self.load_gifts()?.items().to_vec()),
            follow_up: Some(self.load_follow_ups()?),
            config: Some(SnapshotConfig::Full(config.clone())),
            agenda: Some(self.load_agenda()?.segments().cloned().collect()),
        })
    }

    /// Replace each collection present in `snapshot`, all in one transaction.
    ///
    /// Collections missing from the snapshot are left as they are. Any
    /// failing row (for example two check-ins for one member and date) rolls
    /// the whole import back. Returns the snapshot's config resolved
    /// against `current`, which the caller is responsible for saving; an
    /// invalid config fails the import before any data is touched.
    pub fn import_snapshot(
        &self,
        snapshot: &Snapshot,
        current: &Config,
    ) -> Result<Option<Config>, CoreError> {
        let config = snapshot.config.as_ref().map(|c| c.resolve(current));
        if let Some(config) = &config {
            config.validate()?;
        }
        self.restore_collections(snapshot)?;
        Ok(config)
    }

    fn restore_collections(&self, snapshot: &Snapshot) -> Result<(), DatabaseError> {
        let skipped: Vec<&str> = [
            ("members", snapshot.members.is_none()),
            ("attendance", snapshot.attendance.is_none()),
            ("redemptions", snapshot.redemptions.is_none()),
            ("gifts", snapshot.gifts.is_none()),
            ("followUp", snapshot.follow_up.is_none()),
            ("agenda", snapshot.agenda.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect();
        if !skipped.is_empty() {
            tracing::warn!(?skipped, "backup lacks collections; keeping current data for them");
        }

        let tx = self.conn().unchecked_transaction()?;

        if let Some(members) = &snapshot.members {
            tx.execute("DELETE FROM members", [])?;
            for member in members {
                self.upsert_member(member)?;
            }
            tracing::info!(count = members.len(), "restored members");
        }
        if let Some(attendance) = &snapshot.attendance {
            tx.execute("DELETE FROM attendance", [])?;
            for record in attendance {
                self.insert_attendance(record)?;
            }
            tracing::info!(count = attendance.len(), "restored attendance");
        }
        if let Some(redemptions) = &snapshot.redemptions {
            tx.execute("DELETE FROM redemptions", [])?;
            for record in redemptions {
                self.insert_redemption(record)?;
            }
            tracing::info!(count = redemptions.len(), "restored redemptions");
        }
        if let Some(gifts) = &snapshot.gifts {
            tx.execute("DELETE FROM gifts", [])?;
            for gift in gifts {
                self.insert_gift(gift)?;
            }
            tracing::info!(count = gifts.len(), "restored gifts");
        }
        if let Some(logs) = &snapshot.follow_up {
            tx.execute("DELETE FROM follow_ups", [])?;
            for log in logs {
                self.insert_follow_up(log)?;
            }
            tracing::info!(count = logs.len(), "restored follow-ups");
        }
        if let Some(segments) = &snapshot.agenda {
            tx.execute("DELETE FROM segments", [])?;
            for segment in segments {
                self.upsert_segment(segment)?;
            }
            tracing::info!(count = segments.len(), "restored agenda");
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::CheckInMethod;
    use chrono::NaiveDate;

    fn attendance(id: &str, member_id: &str, day: u32) -> AttendanceRecord {
        AttendanceRecord {
            id: id.into(),
            member_id: member_id.into(),
            timestamp: 0,
            date_str: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            points: 10,
            method: CheckInMethod::Face,
        }
    }

    fn seeded() -> Database {
        let db = Database::open_memory().unwrap();
        let mut mina = Member::new("Mina").unwrap();
        mina.id = "m1".into();
        db.upsert_member(&mina).unwrap();
        db.insert_attendance(&attendance("a1", "m1", 6)).unwrap();
        db.seed_gifts_if_empty().unwrap();
        db
    }

    #[test]
    fn export_then_import_into_empty_database() {
        let source = seeded();
        let snapshot = source.export_snapshot(&Config::default()).unwrap();

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"followUp\""));
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();

        let target = Database::open_memory().unwrap();
        let config = target.import_snapshot(&parsed, &Config::default()).unwrap();
        assert_eq!(config, Some(Config::default()));
        assert_eq!(target.load_roster().unwrap(), source.load_roster().unwrap());
        assert_eq!(target.load_ledger().unwrap(), source.load_ledger().unwrap());
        assert_eq!(target.load_gifts().unwrap().items().len(), 6);
    }

    #[test]
    fn partial_snapshot_leaves_other_collections() {
        let db = seeded();
        let snapshot: Snapshot = serde_json::from_str(r#"{"gifts": []}"#).unwrap();
        assert_eq!(db.import_snapshot(&snapshot, &Config::default()).unwrap(), None);

        assert!(db.load_gifts().unwrap().items().is_empty());
        assert_eq!(db.load_roster().unwrap().len(), 1);
        assert_eq!(db.load_ledger().unwrap().attendance().len(), 1);
    }

    #[test]
    fn duplicate_rows_roll_back_the_whole_import() {
        let db = seeded();
        let snapshot = Snapshot {
            members: Some(vec![]),
            attendance: Some(vec![attendance("x1", "m2", 13), attendance("x2", "m2", 13)]),
            ..Snapshot::default()
        };
        assert!(db.import_snapshot(&snapshot, &Config::default()).is_err());

        assert_eq!(db.load_roster().unwrap().len(), 1);
        let ledger = db.load_ledger().unwrap();
        assert_eq!(ledger.attendance().len(), 1);
        assert_eq!(ledger.attendance()[0].id, "a1");
    }

    #[test]
    fn web_app_export_replaces_only_meeting_settings() {
        let db = seeded();
        let json = r#"{
            "members": [],
            "announcements": [],
            "config": {
                "startTime": "19:30",
                "pointsOnTime": 20,
                "pointsLate15": 12,
                "pointsLate30": 6,
                "pointsLate": 2
            }
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();

        let mut current = Config::default();
        current.apply("leaderboard.top_n", "3").unwrap();
        let config = db.import_snapshot(&snapshot, &current).unwrap().unwrap();

        assert_eq!(config.meeting.start_time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
        assert_eq!(config.meeting.points_on_time, 20);
        assert_eq!(config.meeting.points_late_15, 12);
        assert_eq!(config.meeting.points_late_30, 6);
        assert_eq!(config.meeting.points_late, 2);
        assert_eq!(config.leaderboard.top_n, 3);
        assert!(db.load_roster().unwrap().is_empty());
    }

    #[test]
    fn unrecognized_config_shape_is_rejected() {
        let json = r#"{"config": {"pointsOnTime": 20}}"#;
        assert!(serde_json::from_str::<Snapshot>(json).is_err());
    }

    #[test]
    fn invalid_config_fails_before_data_changes() {
        let db = seeded();
        let json = r#"{
            "members": [],
            "config": {
                "startTime": "18:00",
                "pointsOnTime": 1,
                "pointsLate15": 7,
                "pointsLate30": 4,
                "pointsLate": 1
            }
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert!(db.import_snapshot(&snapshot, &Config::default()).is_err());
        assert_eq!(db.load_roster().unwrap().len(), 1);
    }
}
