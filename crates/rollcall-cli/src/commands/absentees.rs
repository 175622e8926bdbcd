use chrono::Local;
use clap::Args;
use rollcall_core::{absentees, last_contact, AbsenceQuery, Config, Database, ServantFilter};
use serde_json::json;

use super::{print_json, CmdResult};

#[derive(Args)]
pub struct AbsenteesArgs {
    /// Minimum consecutive misses; defaults to the configured value
    #[arg(long)]
    weeks: Option<usize>,
    /// Servant username, "unassigned" or "all"
    #[arg(long)]
    servant: Option<String>,
    /// Use the dashboard card settings instead
    #[arg(long, conflicts_with = "weeks")]
    dashboard: bool,
}

pub fn run(args: AbsenteesArgs) -> CmdResult {
    let config = Config::load()?;
    let today = Local::now().date_naive();
    let query = if args.dashboard {
        AbsenceQuery::dashboard(today, &config.follow_up)
    } else {
        let weeks = args.weeks.unwrap_or(config.follow_up.default_weeks);
        AbsenceQuery::follow_up(today, weeks, &config.follow_up)
    };
    let query = match args.servant.as_deref() {
        Some(s) => query.with_servant(ServantFilter::parse(s)),
        None => query,
    };

    let db = Database::open()?;
    let roster = db.load_roster()?;
    let ledger = db.load_ledger()?;
    let follow_ups = db.load_follow_ups()?;
    let rows: Vec<_> = absentees(ledger.attendance(), &roster, &query)
        .into_iter()
        .map(|a| {
            json!({
                "id": a.member.id,
                "name": a.member.name,
                "phone": a.member.phone,
                "consecutiveMisses": a.consecutive_misses,
                "lastAttended": a.last_attended,
                "lastContact": last_contact(&follow_ups, &a.member.id),
            })
        })
        .collect();
    print_json(&rows)
}
