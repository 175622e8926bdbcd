pub mod absentees;
pub mod agenda;
pub mod attendance;
pub mod backup;
pub mod checkin;
pub mod config;
pub mod followup;
pub mod gift;
pub mod leaderboard;
pub mod member;
pub mod pick;
pub mod points;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use rollcall_core::{LedgerError, Member, Roster, ValidationError};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Find a member by id, or by exact (case-insensitive) name when unique.
pub fn resolve_member<'a>(roster: &'a Roster, key: &str) -> Result<&'a Member, LedgerError> {
    if let Some(member) = roster.get(key) {
        return Ok(member);
    }
    let mut by_name = roster
        .members()
        .iter()
        .filter(|m| m.name.eq_ignore_ascii_case(key));
    match (by_name.next(), by_name.next()) {
        (Some(member), None) => Ok(member),
        _ => roster.require(key),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse `YYYY-MM-DDTHH:MM` as local wall-clock time.
pub fn parse_local(s: &str) -> Result<DateTime<Local>, ValidationError> {
    let invalid = || ValidationError::InvalidValue {
        field: "at".into(),
        message: format!("'{s}' is not a local YYYY-MM-DDTHH:MM time"),
    };
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").map_err(|_| invalid())?;
    Local.from_local_datetime(&naive).single().ok_or_else(invalid)
}

/// `--date` value, defaulting to today's local date.
pub fn date_or_today(date: Option<&str>) -> Result<NaiveDate, ValidationError> {
    match date {
        Some(s) => rollcall_core::time::parse_date(s),
        None => Ok(Local::now().date_naive()),
    }
}
