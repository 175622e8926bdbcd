use chrono::Local;
use clap::Args;
use rollcall_core::{CheckInMethod, Config, Database, ValidationError};

use super::{parse_local, resolve_member, CmdResult};

#[derive(Args)]
pub struct CheckinArgs {
    /// Member id or name
    member: String,
    /// How the member was identified: face, fingerprint or manual
    #[arg(long, default_value = "manual")]
    method: String,
    /// Arrival time (YYYY-MM-DDTHH:MM, local); defaults to now
    #[arg(long)]
    at: Option<String>,
}

pub fn run(args: CheckinArgs) -> CmdResult {
    let method = CheckInMethod::parse(&args.method).ok_or_else(|| ValidationError::InvalidValue {
        field: "method".into(),
        message: format!("expected face, fingerprint or manual, got '{}'", args.method),
    })?;
    let arrival = match args.at.as_deref() {
        Some(s) => parse_local(s)?,
        None => Local::now(),
    };

    let config = Config::load()?;
    let db = Database::open()?;
    let roster = db.load_roster()?;
    let member = resolve_member(&roster, &args.member)?;

    let mut ledger = db.load_ledger()?;
    let check_in = ledger.record_attendance(&member.id, &arrival, method, &config.meeting)?;
    db.insert_attendance(&check_in.record)?;

    println!(
        "{} checked in: {} ({:+} min), +{} points, balance {}",
        member.name,
        check_in.score.status.label(),
        check_in.score.delta_minutes,
        check_in.score.points,
        ledger.current_balance(&member.id),
    );
    Ok(())
}
