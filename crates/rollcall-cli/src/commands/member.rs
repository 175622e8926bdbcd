//! Roster commands for CLI.

use chrono::Local;
use clap::Subcommand;
use rollcall_core::{last_contact, time::parse_date, Database, Member, ServantFilter};
use serde_json::json;

use super::{print_json, resolve_member, CmdResult};

#[derive(Subcommand)]
pub enum MemberAction {
    /// Add a member to the roster
    Add {
        /// Full name
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        college: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        confession_father: Option<String>,
        /// Username of the servant who follows up with this member
        #[arg(long)]
        servant: Option<String>,
    },
    /// List members
    List {
        /// Only members whose name or phone contains this text
        #[arg(long)]
        search: Option<String>,
        /// Servant username, "unassigned" or "all"
        #[arg(long)]
        servant: Option<String>,
    },
    /// Show a member with balance, history and last contact
    Show {
        /// Member id or name
        member: String,
    },
    /// Remove a member (ledger records are kept)
    Remove {
        /// Member id or name
        member: String,
    },
    /// Upcoming birthdays
    Birthdays {
        /// Days ahead to look
        #[arg(long, default_value = "7")]
        days: i64,
    },
}

pub fn run(action: MemberAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        MemberAction::Add {
            name,
            phone,
            birth_date,
            address,
            college,
            year,
            confession_father,
            servant,
        } => {
            let member = Member {
                phone,
                birth_date: birth_date.as_deref().map(parse_date).transpose()?,
                address,
                college,
                year,
                confession_father,
                responsible_servant: servant,
                ..Member::new(name)?
            };
            db.upsert_member(&member)?;
            println!("Member added: {}", member.id);
        }
        MemberAction::List { search, servant } => {
            let roster = db.load_roster()?;
            let filter = servant.as_deref().map(ServantFilter::parse).unwrap_or_default();
            let term = search.unwrap_or_default();
            let members: Vec<&Member> = roster
                .search(&term)
                .filter(|m| filter.matches(m))
                .collect();
            print_json(&members)?;
        }
        MemberAction::Show { member } => {
            let roster = db.load_roster()?;
            let member = resolve_member(&roster, &member)?;
            let ledger = db.load_ledger()?;
            let follow_ups = db.load_follow_ups()?;
            print_json(&json!({
                "member": member,
                "balance": ledger.balance(&member.id),
                "attendance": ledger.history(&member.id),
                "redemptions": ledger.redemptions_for(&member.id),
                "lastContact": last_contact(&follow_ups, &member.id),
            }))?;
        }
        MemberAction::Remove { member } => {
            let roster = db.load_roster()?;
            let member = resolve_member(&roster, &member)?;
            db.delete_member(&member.id)?;
            println!("Member removed: {}", member.name);
        }
        MemberAction::Birthdays { days } => {
            let roster = db.load_roster()?;
            let today = Local::now().date_naive();
            let due: Vec<_> = roster
                .upcoming_birthdays(today, days)
                .into_iter()
                .map(|(m, date)| json!({ "id": m.id, "name": m.name, "birthday": date }))
                .collect();
            print_json(&due)?;
        }
    }
    Ok(())
}
