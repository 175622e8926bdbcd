//! Member roster.
//!
//! The engine only reads member profiles; it never edits them as a side
//! effect of scoring or aggregation. Deleting a member leaves their ledger
//! records in place, and aggregate views silently drop the orphans.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LedgerError, ValidationError};

/// A group member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, alias = "dob", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confession_father: Option<String>,
    /// Username of the servant who follows up with this member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_servant: Option<String>,
    #[serde(default)]
    pub has_face_id: bool,
    #[serde(default)]
    pub fingerprint_count: u32,
}

impl Member {
    /// New member with a fresh id and an empty profile.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            phone: String::new(),
            birth_date: None,
            address: None,
            college: None,
            year: None,
            confession_father: None,
            responsible_servant: None,
            has_face_id: false,
            fingerprint_count: 0,
        })
    }

    /// Whether the member has any biometric enrollment.
    pub fn is_enrolled(&self) -> bool {
        self.has_face_id || self.fingerprint_count > 0
    }

    /// Next occurrence of the member's birthday on or after `today`.
    pub fn next_birthday(&self, today: NaiveDate) -> Option<NaiveDate> {
        let dob = self.birth_date?;
        let this_year = anniversary(dob, today.year())?;
        if this_year >= today {
            Some(this_year)
        } else {
            anniversary(dob, today.year() + 1)
        }
    }
}

/// `dob` moved to `year`; Feb 29 falls back to Feb 28 outside leap years.
fn anniversary(dob: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, dob.month(), dob.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, dob.month(), dob.day() - 1))
}

/// Roster restriction by responsible servant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServantFilter {
    #[default]
    All,
    /// Members with no responsible servant
    Unassigned,
    /// Members assigned to this servant username
    Servant(String),
}

impl ServantFilter {
    /// Parse `all`, `unassigned`, or a servant username.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "" | "unassigned" => ServantFilter::Unassigned,
            v if v.eq_ignore_ascii_case("all") => ServantFilter::All,
            v => ServantFilter::Servant(v.to_string()),
        }
    }

    pub fn matches(&self, member: &Member) -> bool {
        let assigned = member
            .responsible_servant
            .as_deref()
            .filter(|s| !s.is_empty());
        match self {
            ServantFilter::All => true,
            ServantFilter::Unassigned => assigned.is_none(),
            ServantFilter::Servant(id) => assigned == Some(id.as_str()),
        }
    }
}

/// The set of known members, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_members(members: Vec<Member>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Look up a member, failing with `MemberNotFound`.
    pub fn require(&self, id: &str) -> Result<&Member, LedgerError> {
        self.get(id)
            .ok_or_else(|| LedgerError::MemberNotFound(id.to_string()))
    }

    /// Insert, or replace the member with the same id in place.
    pub fn upsert(&mut self, member: Member) {
        match self.members.iter_mut().find(|m| m.id == member.id) {
            Some(existing) => *existing = member,
            None => self.members.push(member),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Member> {
        let index = self.members.iter().position(|m| m.id == id)?;
        Some(self.members.remove(index))
    }

    /// Members whose name or phone contains `term`.
    pub fn search<'a>(&'a self, term: &'a str) -> impl Iterator<Item = &'a Member> + 'a {
        self.members
            .iter()
            .filter(move |m| m.name.contains(term) || m.phone.contains(term))
    }

    /// Members matching a servant filter.
    pub fn assigned_to<'a, 'f>(
        &'a self,
        filter: &'f ServantFilter,
    ) -> impl Iterator<Item = &'a Member> + 'f
    where
        'a: 'f,
    {
        self.members.iter().filter(move |m| filter.matches(m))
    }

    /// Members with a birthday in `[today, today + days]`, soonest first.
    pub fn upcoming_birthdays(&self, today: NaiveDate, days: i64) -> Vec<(&Member, NaiveDate)> {
        let horizon = today + Duration::days(days);
        let mut due: Vec<(&Member, NaiveDate)> = self
            .members
            .iter()
            .filter_map(|m| m.next_birthday(today).map(|d| (m, d)))
            .filter(|(_, d)| *d <= horizon)
            .collect();
        due.sort_by_key(|(_, d)| *d);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member(id: &str, name: &str) -> Member {
        Member {
            id: id.to_string(),
            ..Member::new(name).unwrap()
        }
    }

    #[test]
    fn rejects_blank_names() {
        assert_eq!(Member::new("  "), Err(ValidationError::EmptyField("name")));
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut roster = Roster::new();
        roster.upsert(member("1", "Mina"));
        roster.upsert(member("2", "Kirollos"));
        roster.upsert(member("1", "Mina Magdy"));

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.members()[0].name, "Mina Magdy");
    }

    #[test]
    fn require_reports_missing_member() {
        let roster = Roster::new();
        assert_eq!(
            roster.require("x"),
            Err(LedgerError::MemberNotFound("x".into()))
        );
    }

    #[test]
    fn servant_filter_matches_assignment() {
        let mut assigned = member("1", "A");
        assigned.responsible_servant = Some("george".into());
        let mut blank = member("2", "B");
        blank.responsible_servant = Some(String::new());
        let none = member("3", "C");

        let george = ServantFilter::parse("george");
        assert!(george.matches(&assigned));
        assert!(!george.matches(&none));

        let unassigned = ServantFilter::parse("unassigned");
        assert!(!unassigned.matches(&assigned));
        assert!(unassigned.matches(&blank));
        assert!(unassigned.matches(&none));

        assert!(ServantFilter::parse("ALL").matches(&assigned));
    }

    #[test]
    fn upcoming_birthdays_wrap_year_end() {
        let mut dec = member("1", "Dec");
        dec.birth_date = Some(date(2000, 12, 30));
        let mut jan = member("2", "Jan");
        jan.birth_date = Some(date(2001, 1, 3));
        let mut june = member("3", "June");
        june.birth_date = Some(date(2002, 6, 1));
        let roster = Roster::from_members(vec![jan, june, dec]);

        let due = roster.upcoming_birthdays(date(2026, 12, 29), 7);
        let names: Vec<&str> = due.iter().map(|(m, _)| m.name.as_str()).collect();
        assert_eq!(names, vec!["Dec", "Jan"]);
        assert_eq!(due[1].1, date(2027, 1, 3));
    }

    #[test]
    fn leap_day_birthday_falls_back_to_feb_28() {
        let mut leap = member("1", "Leap");
        leap.birth_date = Some(date(2004, 2, 29));
        assert_eq!(leap.next_birthday(date(2026, 2, 1)), Some(date(2026, 2, 28)));
    }

    #[test]
    fn search_matches_name_or_phone() {
        let mut m = member("1", "Marina");
        m.phone = "01000111222".into();
        let roster = Roster::from_members(vec![m, member("2", "Kirollos")]);
        assert_eq!(roster.search("0100").count(), 1);
        assert_eq!(roster.search("rol").count(), 1);
    }

    #[test]
    fn deserializes_legacy_dob_field() {
        let json = r#"{"id":"1","name":"Mina","phone":"012","dob":"2000-01-15","fingerprintCount":2}"#;
        let m: Member = serde_json::from_str(json).unwrap();
        assert_eq!(m.birth_date, Some(date(2000, 1, 15)));
        assert!(m.is_enrolled());
    }
}
