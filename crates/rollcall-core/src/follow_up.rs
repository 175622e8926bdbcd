//! Pastoral follow-up log.
//!
//! Servants record each call, message or visit made to a member. The
//! newest entry per member is shown next to absence alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Call,
    Message,
    Visit,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Call => "call",
            InteractionKind::Message => "message",
            InteractionKind::Visit => "visit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "call" => Some(InteractionKind::Call),
            "message" => Some(InteractionKind::Message),
            "visit" => Some(InteractionKind::Visit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpLog {
    pub id: String,
    pub member_id: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub note: String,
    pub servant_name: String,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
}

impl FollowUpLog {
    pub fn new(
        member_id: &str,
        note: &str,
        servant_name: &str,
        kind: InteractionKind,
        at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if note.trim().is_empty() {
            return Err(ValidationError::EmptyField("note"));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            member_id: member_id.to_string(),
            timestamp: at.timestamp_millis(),
            note: note.to_string(),
            servant_name: servant_name.to_string(),
            kind,
        })
    }
}

/// Most recent follow-up for a member.
pub fn last_contact<'a>(logs: &'a [FollowUpLog], member_id: &str) -> Option<&'a FollowUpLog> {
    logs.iter()
        .filter(|l| l.member_id == member_id)
        .max_by_key(|l| l.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn empty_note_is_rejected() {
        let err = FollowUpLog::new("m1", "   ", "admin", InteractionKind::Call, Utc::now());
        assert_eq!(err, Err(ValidationError::EmptyField("note")));
    }

    #[test]
    fn last_contact_picks_newest_for_member() {
        let now = Utc::now();
        let logs = vec![
            FollowUpLog::new("m1", "called", "a", InteractionKind::Call, now - Duration::days(7)).unwrap(),
            FollowUpLog::new("m1", "visited", "b", InteractionKind::Visit, now).unwrap(),
            FollowUpLog::new("m2", "texted", "a", InteractionKind::Message, now + Duration::days(1)).unwrap(),
        ];
        assert_eq!(last_contact(&logs, "m1").map(|l| l.note.as_str()), Some("visited"));
        assert!(last_contact(&logs, "m3").is_none());
    }

    #[test]
    fn serializes_kind_as_type() {
        let log = FollowUpLog::new("m1", "hi", "a", InteractionKind::Message, Utc::now()).unwrap();
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["memberId"], "m1");
    }
}
