use chrono::Utc;
use clap::Subcommand;
use rollcall_core::{Database, FollowUpLog, InteractionKind, ValidationError};

use super::{print_json, resolve_member, CmdResult};

#[derive(Subcommand)]
pub enum FollowupAction {
    /// Record a contact with a member
    Log {
        /// Member id or name
        member: String,
        /// What was said or agreed
        note: String,
        /// call, message or visit
        #[arg(long, default_value = "call")]
        kind: String,
        /// Servant who made the contact
        #[arg(long, default_value = "admin")]
        servant: String,
    },
    /// List follow-up notes, newest first
    List {
        /// Member id or name
        member: Option<String>,
    },
}

pub fn run(action: FollowupAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        FollowupAction::Log {
            member,
            note,
            kind,
            servant,
        } => {
            let kind = InteractionKind::parse(&kind).ok_or_else(|| ValidationError::InvalidValue {
                field: "kind".into(),
                message: format!("expected call, message or visit, got '{kind}'"),
            })?;
            let roster = db.load_roster()?;
            let member = resolve_member(&roster, &member)?;
            let log = FollowUpLog::new(&member.id, &note, &servant, kind, Utc::now())?;
            db.insert_follow_up(&log)?;
            println!("Follow-up logged for {}", member.name);
        }
        FollowupAction::List { member } => {
            let member_id = match member {
                Some(key) => Some(resolve_member(&db.load_roster()?, &key)?.id.clone()),
                None => None,
            };
            let mut logs: Vec<FollowUpLog> = db
                .load_follow_ups()?
                .into_iter()
                .filter(|l| member_id.as_ref().map_or(true, |id| &l.member_id == id))
                .collect();
            logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            print_json(&logs)?;
        }
    }
    Ok(())
}
