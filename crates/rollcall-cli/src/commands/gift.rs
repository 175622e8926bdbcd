use clap::Subcommand;
use rollcall_core::{Database, GiftItem};

use super::{print_json, resolve_member, CmdResult};

#[derive(Subcommand)]
pub enum GiftAction {
    /// Add a gift to the catalog
    Add {
        name: String,
        /// Points needed to redeem it
        cost: i64,
    },
    /// List the catalog (seeded with starter gifts when empty)
    List {
        /// Only gifts this member can afford, cheapest first
        #[arg(long)]
        member: Option<String>,
    },
    /// Remove a gift
    Remove {
        /// Gift id
        id: String,
    },
}

pub fn run(action: GiftAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        GiftAction::Add { name, cost } => {
            let gift = GiftItem::new(name, cost)?;
            db.insert_gift(&gift)?;
            println!("Gift added: {}", gift.id);
        }
        GiftAction::List { member } => {
            db.seed_gifts_if_empty()?;
            let catalog = db.load_gifts()?;
            match member {
                Some(key) => {
                    let roster = db.load_roster()?;
                    let member = resolve_member(&roster, &key)?;
                    let balance = db.load_ledger()?.current_balance(&member.id);
                    print_json(&catalog.affordable(balance))?;
                }
                None => print_json(&catalog)?,
            }
        }
        GiftAction::Remove { id } => {
            if db.delete_gift(&id)? {
                println!("Gift removed: {id}");
            } else {
                return Err(format!("gift not found: {id}").into());
            }
        }
    }
    Ok(())
}
