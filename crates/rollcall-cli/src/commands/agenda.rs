//! Agenda commands for CLI.

use chrono::Local;
use clap::Subcommand;
use rollcall_core::{time::parse_time_of_day, Database, MeetingSegment};

use super::{date_or_today, print_json, CmdResult};

#[derive(Subcommand)]
pub enum AgendaAction {
    /// Segments for a date
    List {
        /// Meeting date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Add a segment
    Add {
        title: String,
        /// Start time (HH:MM)
        start: String,
        /// End time (HH:MM)
        end: String,
        /// Meeting date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        servant: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Remove a segment
    Remove {
        /// Segment id
        id: String,
    },
    /// The segment running right now
    Now,
}

pub fn run(action: AgendaAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        AgendaAction::List { date } => {
            let date = date_or_today(date.as_deref())?;
            let agenda = db.load_agenda()?;
            print_json(agenda.segments_for_date(date))?;
        }
        AgendaAction::Add {
            title,
            start,
            end,
            date,
            servant,
            notes,
            icon,
        } => {
            let date = date_or_today(date.as_deref())?;
            let mut segment = MeetingSegment::new(
                date,
                title,
                parse_time_of_day(&start)?,
                parse_time_of_day(&end)?,
            )?;
            segment.servant_name = servant;
            segment.notes = notes;
            segment.icon = icon;

            let mut agenda = db.load_agenda()?;
            let added = agenda.add_segment(segment)?;
            db.upsert_segment(added)?;
            println!("Segment added: {}", added.id);
        }
        AgendaAction::Remove { id } => {
            if db.delete_segment(&id)? {
                println!("Segment removed: {id}");
            } else {
                return Err(format!("segment not found: {id}").into());
            }
        }
        AgendaAction::Now => {
            let agenda = db.load_agenda()?;
            match agenda.active_at(&Local::now()) {
                Some(segment) => print_json(segment)?,
                None => println!("No segment running"),
            }
        }
    }
    Ok(())
}
