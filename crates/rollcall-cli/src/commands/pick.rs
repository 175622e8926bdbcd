use chrono::Local;
use rollcall_core::{pick_present, Database};

use super::CmdResult;

pub fn run() -> CmdResult {
    let db = Database::open()?;
    let roster = db.load_roster()?;
    let ledger = db.load_ledger()?;
    let today = Local::now().date_naive();

    match pick_present(ledger.attendance(), &roster, today, &mut rand::thread_rng()) {
        Some(member) => println!("{}", member.name),
        None => println!("Nobody has checked in today"),
    }
    Ok(())
}
