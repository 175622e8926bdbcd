//! Per-date meeting agenda.
//!
//! Segments are grouped by local date and kept sorted by start time.
//! Overlapping segments are accepted; when several contain the current
//! minute the earliest-starting one is active.

mod segment;

pub use segment::MeetingSegment;

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::error::LedgerError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Agenda {
    by_date: BTreeMap<NaiveDate, Vec<MeetingSegment>>,
}

impl Agenda {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored segments. Invalid ranges are kept as stored so a
    /// legacy agenda still loads; they can never be active.
    pub fn from_segments(segments: impl IntoIterator<Item = MeetingSegment>) -> Self {
        let mut agenda = Self::new();
        for segment in segments {
            agenda.insert_sorted(segment);
        }
        agenda
    }

    /// Segments for one date, ordered by start time.
    pub fn segments_for_date(&self, date: NaiveDate) -> &[MeetingSegment] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every segment, by date then start time.
    pub fn segments(&self) -> impl Iterator<Item = &MeetingSegment> {
        self.by_date.values().flatten()
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.by_date.keys()
    }

    pub fn get(&self, id: &str) -> Option<&MeetingSegment> {
        self.segments().find(|s| s.id == id)
    }

    /// Add a segment, replacing any segment with the same id.
    ///
    /// Fails with `InvalidSegmentRange` unless start is before end. An
    /// overlap with another segment on the same date is allowed but logged.
    pub fn add_segment(&mut self, segment: MeetingSegment) -> Result<&MeetingSegment, LedgerError> {
        segment.validate()?;
        self.remove_segment(&segment.id);

        let clashes: Vec<&str> = self
            .overlapping(&segment)
            .map(|s| s.title.as_str())
            .collect();
        if !clashes.is_empty() {
            tracing::warn!(
                date = %segment.date_str,
                title = %segment.title,
                ?clashes,
                "segment overlaps existing agenda entries"
            );
        }

        tracing::info!(id = %segment.id, date = %segment.date_str, "segment added");
        let date = segment.date_str;
        let index = self.insert_sorted(segment);
        Ok(&self.by_date[&date][index])
    }

    /// Remove a segment by id from whichever date holds it.
    pub fn remove_segment(&mut self, id: &str) -> Option<MeetingSegment> {
        let (date, index) = self.by_date.iter().find_map(|(date, segments)| {
            segments
                .iter()
                .position(|s| s.id == id)
                .map(|index| (*date, index))
        })?;

        let segments = self.by_date.get_mut(&date)?;
        let removed = segments.remove(index);
        if segments.is_empty() {
            self.by_date.remove(&date);
        }
        Some(removed)
    }

    /// Other segments on the same date whose window intersects `segment`.
    pub fn overlapping<'a>(
        &'a self,
        segment: &'a MeetingSegment,
    ) -> impl Iterator<Item = &'a MeetingSegment> + 'a {
        self.segments_for_date(segment.date_str)
            .iter()
            .filter(move |s| s.id != segment.id && s.overlaps(segment))
    }

    /// Active segment of the agenda for `now`'s local date.
    pub fn active_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<&MeetingSegment> {
        let date = now.date_naive();
        let id = active_segment(now, date, self.segments_for_date(date))?;
        self.segments_for_date(date).iter().find(|s| s.id == id)
    }

    /// Insert after any segment with the same start time; returns the index.
    fn insert_sorted(&mut self, segment: MeetingSegment) -> usize {
        let segments = self.by_date.entry(segment.date_str).or_default();
        let index = segments.partition_point(|s| s.start_time <= segment.start_time);
        segments.insert(index, segment);
        index
    }
}

/// Id of the segment running at `now`.
///
/// `None` whenever `date` is not `now`'s local date. Otherwise the first
/// segment in `segments` whose half-open window contains `now`'s local
/// minute. Pure, so it is safe to poll on a timer.
pub fn active_segment<'a, Tz: TimeZone>(
    now: &DateTime<Tz>,
    date: NaiveDate,
    segments: &'a [MeetingSegment],
) -> Option<&'a str> {
    if now.date_naive() != date {
        return None;
    }
    let time = now.time();
    segments
        .iter()
        .find(|s| s.contains(time))
        .map(|s| s.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveTime};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
    }

    fn segment(id: &str, day: u32, start: (u32, u32), end: (u32, u32)) -> MeetingSegment {
        MeetingSegment {
            id: id.to_string(),
            ..MeetingSegment::new(date(day), id, hm(start.0, start.1), hm(end.0, end.1)).unwrap()
        }
    }

    fn at(day: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 2, day, h, m, 0)
            .unwrap()
    }

    #[test]
    fn end_boundary_belongs_to_the_next_segment() {
        let segments = vec![
            segment("first", 13, (8, 0), (8, 30)),
            segment("second", 13, (8, 30), (9, 0)),
        ];
        assert_eq!(active_segment(&at(13, 8, 29), date(13), &segments), Some("first"));
        assert_eq!(active_segment(&at(13, 8, 30), date(13), &segments), Some("second"));
        assert_eq!(active_segment(&at(13, 9, 0), date(13), &segments), None);
    }

    #[test]
    fn other_dates_are_never_live() {
        let segments = vec![segment("s", 13, (0, 0), (23, 59))];
        assert_eq!(active_segment(&at(14, 12, 0), date(13), &segments), None);
        assert_eq!(active_segment(&at(12, 12, 0), date(13), &segments), None);
    }

    #[test]
    fn first_match_wins_on_overlap() {
        let mut agenda = Agenda::new();
        agenda.add_segment(segment("long", 13, (18, 0), (20, 0))).unwrap();
        agenda.add_segment(segment("hymns", 13, (18, 15), (19, 0))).unwrap();

        assert_eq!(agenda.active_at(&at(13, 18, 30)).map(|s| s.id.as_str()), Some("long"));
    }

    #[test]
    fn rejects_inverted_and_empty_ranges() {
        let mut agenda = Agenda::new();
        let mut bad = segment("ok", 13, (18, 0), (18, 15));
        bad.end_time = hm(17, 0);
        assert_eq!(
            agenda.add_segment(bad).unwrap_err(),
            LedgerError::InvalidSegmentRange {
                start: hm(18, 0),
                end: hm(17, 0)
            }
        );

        assert!(MeetingSegment::new(date(13), "zero", hm(18, 0), hm(18, 0)).is_err());
        assert_eq!(agenda.segments().count(), 0);
    }

    #[test]
    fn keeps_segments_sorted_by_start() {
        let mut agenda = Agenda::new();
        agenda.add_segment(segment("c", 13, (19, 0), (20, 0))).unwrap();
        agenda.add_segment(segment("a", 13, (18, 0), (18, 15))).unwrap();
        agenda.add_segment(segment("b", 13, (18, 15), (19, 0))).unwrap();
        agenda.add_segment(segment("x", 20, (18, 0), (18, 15))).unwrap();

        let ids: Vec<&str> = agenda
            .segments_for_date(date(13))
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(agenda.segments_for_date(date(20)).len(), 1);
        assert!(agenda.segments_for_date(date(27)).is_empty());
    }

    #[test]
    fn re_adding_an_id_moves_the_segment() {
        let mut agenda = Agenda::new();
        agenda.add_segment(segment("a", 13, (18, 0), (18, 15))).unwrap();
        agenda.add_segment(segment("a", 20, (19, 0), (19, 30))).unwrap();

        assert!(agenda.segments_for_date(date(13)).is_empty());
        assert_eq!(agenda.get("a").unwrap().start_time, hm(19, 0));
        assert_eq!(agenda.dates().count(), 1);
    }

    #[test]
    fn remove_only_touches_its_date() {
        let mut agenda = Agenda::from_segments(vec![
            segment("a", 13, (18, 0), (18, 15)),
            segment("b", 20, (18, 0), (18, 15)),
        ]);
        assert_eq!(agenda.remove_segment("a").map(|s| s.id), Some("a".to_string()));
        assert!(agenda.remove_segment("a").is_none());
        assert_eq!(agenda.segments_for_date(date(20)).len(), 1);
    }

    #[test]
    fn overlapping_lists_same_date_intersections() {
        let agenda = Agenda::from_segments(vec![
            segment("a", 13, (18, 0), (18, 30)),
            segment("b", 13, (18, 30), (19, 0)),
            segment("c", 20, (18, 0), (19, 0)),
        ]);
        let candidate = segment("p", 13, (18, 20), (18, 40));
        let ids: Vec<&str> = agenda.overlapping(&candidate).map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn polling_does_not_mutate() {
        let agenda = Agenda::from_segments(vec![segment("a", 13, (18, 0), (18, 30))]);
        let before = agenda.clone();
        for minute in 0..60 {
            let _ = agenda.active_at(&at(13, 18, minute));
        }
        assert_eq!(agenda, before);
    }

    #[test]
    fn segment_json_uses_hh_mm() {
        let s = segment("a", 13, (8, 5), (9, 0));
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["startTime"], "08:05");
        assert_eq!(json["dateStr"], "2026-02-13");
        let back: MeetingSegment = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }
}
