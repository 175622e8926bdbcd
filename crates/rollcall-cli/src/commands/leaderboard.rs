use chrono::Local;
use clap::Args;
use rollcall_core::{leaderboard, Config, Database, Period, ValidationError};
use serde_json::json;

use super::{print_json, CmdResult};

#[derive(Args)]
pub struct LeaderboardArgs {
    /// "month" or "all"; defaults to the configured period
    #[arg(long)]
    period: Option<String>,
    /// Number of rows; defaults to the configured size
    #[arg(long)]
    top: Option<usize>,
}

pub fn run(args: LeaderboardArgs) -> CmdResult {
    let config = Config::load()?;
    let period = match args.period.as_deref() {
        Some(s) => Period::parse(s).ok_or_else(|| ValidationError::InvalidValue {
            field: "period".into(),
            message: format!("expected month or all, got '{s}'"),
        })?,
        None => config.leaderboard.period,
    };
    let top_n = args.top.unwrap_or(config.leaderboard.top_n);

    let db = Database::open()?;
    let roster = db.load_roster()?;
    let ledger = db.load_ledger()?;
    let rows: Vec<_> = leaderboard(ledger.attendance(), &roster, period, &Local::now(), top_n)
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            json!({
                "rank": i + 1,
                "id": entry.member.id,
                "name": entry.member.name,
                "points": entry.points,
            })
        })
        .collect();
    print_json(&rows)
}
