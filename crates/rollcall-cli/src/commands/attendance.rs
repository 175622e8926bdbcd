use clap::Subcommand;
use rollcall_core::{attendance_counts, Database};
use serde_json::json;

use super::{date_or_today, print_json, CmdResult};

#[derive(Subcommand)]
pub enum AttendanceAction {
    /// Check-ins for one meeting date
    List {
        /// Meeting date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete an attendance record
    Remove {
        /// Attendance record id
        id: String,
    },
    /// Check-in counts for the most recent meetings
    Report {
        /// Number of meeting dates
        #[arg(long, default_value = "5")]
        last: usize,
    },
}

pub fn run(action: AttendanceAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        AttendanceAction::List { date } => {
            let date = date_or_today(date.as_deref())?;
            let roster = db.load_roster()?;
            let ledger = db.load_ledger()?;
            let rows: Vec<_> = ledger
                .attendance_on(date)
                .into_iter()
                .map(|r| {
                    json!({
                        "record": r,
                        "name": roster.get(&r.member_id).map(|m| m.name.as_str()),
                    })
                })
                .collect();
            print_json(&rows)?;
        }
        AttendanceAction::Remove { id } => {
            if db.delete_attendance(&id)? {
                println!("Attendance removed: {id}");
            } else {
                return Err(format!("attendance record not found: {id}").into());
            }
        }
        AttendanceAction::Report { last } => {
            let ledger = db.load_ledger()?;
            print_json(&attendance_counts(ledger.attendance(), last))?;
        }
    }
    Ok(())
}
