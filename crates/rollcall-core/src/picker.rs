//! Lucky draw among today's attendees.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::ledger::AttendanceRecord;
use crate::roster::{Member, Roster};

/// Roster members with an attendance record on `today`, in roster order.
pub fn present_members<'a>(
    records: &[AttendanceRecord],
    roster: &'a Roster,
    today: NaiveDate,
) -> Vec<&'a Member> {
    roster
        .members()
        .iter()
        .filter(|m| {
            records
                .iter()
                .any(|r| r.date_str == today && r.member_id == m.id)
        })
        .collect()
}

/// Pick one present member uniformly at random; `None` if nobody is in.
pub fn pick_present<'a, R: Rng + ?Sized>(
    records: &[AttendanceRecord],
    roster: &'a Roster,
    today: NaiveDate,
    rng: &mut R,
) -> Option<&'a Member> {
    present_members(records, roster, today).choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::CheckInMethod;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn record(member_id: &str, day: u32) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("{member_id}-{day}"),
            member_id: member_id.to_string(),
            timestamp: 0,
            date_str: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            points: 10,
            method: CheckInMethod::Face,
        }
    }

    fn roster() -> Roster {
        Roster::from_members(
            ["a", "b", "c"]
                .iter()
                .map(|id| Member {
                    id: id.to_string(),
                    ..Member::new(*id).unwrap()
                })
                .collect(),
        )
    }

    #[test]
    fn only_todays_attendees_can_win() {
        let roster = roster();
        let records = vec![record("a", 13), record("b", 20), record("c", 20)];
        let today = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        let mut rng = Pcg64::seed_from_u64(7);

        for _ in 0..50 {
            let winner = pick_present(&records, &roster, today, &mut rng).unwrap();
            assert_ne!(winner.id, "a");
        }
    }

    #[test]
    fn empty_room_has_no_winner() {
        let roster = roster();
        let today = NaiveDate::from_ymd_opt(2026, 2, 27).unwrap();
        let mut rng = Pcg64::seed_from_u64(1);
        assert!(pick_present(&[record("a", 20)], &roster, today, &mut rng).is_none());
    }
}
