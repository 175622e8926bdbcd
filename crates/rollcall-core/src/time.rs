//! Local calendar helpers.
//!
//! Meeting dates and times of day are always local-calendar values. The
//! engine never derives them from a UTC conversion: callers pass a
//! `DateTime<Tz>` in the zone used for display and these helpers read the
//! wall-clock fields off it.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike};

use crate::error::ValidationError;

const TIME_FORMAT: &str = "%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a zero-padded `HH:MM` time of day.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = s.trim();
    if trimmed.len() != 5 {
        return Err(ValidationError::InvalidTimeOfDay(s.to_string()));
    }
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .map_err(|_| ValidationError::InvalidTimeOfDay(s.to_string()))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// Minutes since local midnight, seconds dropped.
pub fn minute_of_day(t: NaiveTime) -> i64 {
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

/// Local calendar date of an instant.
pub fn local_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.date_naive()
}

/// Re-express an epoch-millisecond timestamp in the given zone.
///
/// Returns `None` for timestamps outside chrono's representable range.
pub fn from_millis<Tz: TimeZone>(tz: &Tz, millis: i64) -> Option<DateTime<Tz>> {
    tz.timestamp_millis_opt(millis).single()
}

/// Serde adapter storing a `NaiveTime` as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format(super::TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time_of_day(&raw).map_err(de::Error::custom)
    }
}
