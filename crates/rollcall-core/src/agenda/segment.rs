//! A single agenda entry.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, LedgerError, ValidationError};
use crate::time::{hhmm, minute_of_day};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSegment {
    pub id: String,
    pub date_str: NaiveDate,
    pub title: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Presentation tag resolved to a glyph by the UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl MeetingSegment {
    /// New segment with a fresh id. Fails when `end` is not after `start`.
    pub fn new(
        date: NaiveDate,
        title: impl Into<String>,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, CoreError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title").into());
        }
        let segment = Self {
            id: Uuid::new_v4().to_string(),
            date_str: date,
            title,
            start_time: start,
            end_time: end,
            servant_name: None,
            notes: None,
            icon: None,
        };
        segment.validate()?;
        Ok(segment)
    }

    pub fn with_servant(mut self, servant: impl Into<String>) -> Self {
        self.servant_name = Some(servant.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// `start_time < end_time`, compared at minute resolution.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if minute_of_day(self.start_time) >= minute_of_day(self.end_time) {
            return Err(LedgerError::InvalidSegmentRange {
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(())
    }

    /// Half-open containment: `start ≤ t < end`, at minute resolution.
    pub fn contains(&self, t: NaiveTime) -> bool {
        let minute = minute_of_day(t);
        minute_of_day(self.start_time) <= minute && minute < minute_of_day(self.end_time)
    }

    /// Whether the two windows share at least one minute.
    pub fn overlaps(&self, other: &MeetingSegment) -> bool {
        self.date_str == other.date_str
            && minute_of_day(self.start_time) < minute_of_day(other.end_time)
            && minute_of_day(other.start_time) < minute_of_day(self.end_time)
    }
}
