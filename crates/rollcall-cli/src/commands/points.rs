//! Balance and redemption commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use rollcall_core::Database;
use serde_json::json;

use super::{print_json, resolve_member, CmdResult};

#[derive(Subcommand)]
pub enum PointsAction {
    /// Earned, spent and current points for one member
    Balance {
        /// Member id or name
        member: String,
    },
    /// Every member's balance, highest first
    Balances,
    /// Spend points on a gift
    Redeem {
        /// Member id or name
        member: String,
        /// Catalog gift id
        #[arg(long, conflicts_with_all = ["label", "cost"])]
        gift: Option<String>,
        /// Free-form gift label
        #[arg(long, requires = "cost")]
        label: Option<String>,
        /// Points to spend with --label
        #[arg(long, requires = "label")]
        cost: Option<i64>,
        /// Servant handing out the gift
        #[arg(long)]
        servant: Option<String>,
    },
    /// Attendance and redemption history
    History {
        /// Member id or name; all redemptions when omitted
        member: Option<String>,
    },
    /// Undo a redemption, returning its points
    Refund {
        /// Redemption record id
        id: String,
    },
}

pub fn run(action: PointsAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        PointsAction::Balance { member } => {
            let roster = db.load_roster()?;
            let member = resolve_member(&roster, &member)?;
            let ledger = db.load_ledger()?;
            print_json(&json!({
                "id": member.id,
                "name": member.name,
                "balance": ledger.balance(&member.id),
            }))?;
        }
        PointsAction::Balances => {
            let roster = db.load_roster()?;
            let ledger = db.load_ledger()?;
            print_json(&ledger.balances(&roster))?;
        }
        PointsAction::Redeem {
            member,
            gift,
            label,
            cost,
            servant,
        } => {
            let (gift_name, points_cost) = match (gift, label, cost) {
                (Some(id), _, _) => {
                    let catalog = db.load_gifts()?;
                    let item = catalog
                        .get(&id)
                        .ok_or_else(|| format!("gift not found: {id}"))?;
                    (item.name.clone(), item.cost)
                }
                (None, Some(label), Some(cost)) => (label, cost),
                _ => return Err("either --gift or --label with --cost is required".into()),
            };

            let roster = db.load_roster()?;
            let member = resolve_member(&roster, &member)?;
            let mut ledger = db.load_ledger()?;
            let record = ledger.record_redemption(
                &member.id,
                &gift_name,
                points_cost,
                servant.as_deref(),
                Utc::now(),
            )?;
            let remaining = db.redeem(&record)?;
            println!(
                "{} redeemed {} for {} points, {} left",
                member.name, gift_name, points_cost, remaining
            );
        }
        PointsAction::History { member } => {
            let ledger = db.load_ledger()?;
            match member {
                Some(key) => {
                    let roster = db.load_roster()?;
                    let member = resolve_member(&roster, &key)?;
                    print_json(&json!({
                        "attendance": ledger.history(&member.id),
                        "redemptions": ledger.redemptions_for(&member.id),
                    }))?;
                }
                None => {
                    let mut all: Vec<_> = ledger.redemptions().iter().collect();
                    all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                    print_json(&all)?;
                }
            }
        }
        PointsAction::Refund { id } => {
            if db.delete_redemption(&id)? {
                println!("Redemption refunded: {id}");
            } else {
                return Err(format!("redemption not found: {id}").into());
            }
        }
    }
    Ok(())
}
