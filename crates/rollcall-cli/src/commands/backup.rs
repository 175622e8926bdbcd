use std::path::PathBuf;

use clap::Subcommand;
use rollcall_core::{Config, Database, Snapshot};

use super::CmdResult;

#[derive(Subcommand)]
pub enum BackupAction {
    /// Write every collection and the config as JSON
    Export {
        /// Output file; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Restore collections present in a JSON backup
    Import {
        file: PathBuf,
    },
}

pub fn run(action: BackupAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        BackupAction::Export { output } => {
            let snapshot = db.export_snapshot(&Config::load()?)?;
            let json = serde_json::to_string_pretty(&snapshot)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Backup written to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        BackupAction::Import { file } => {
            let content = std::fs::read_to_string(&file)?;
            let snapshot: Snapshot = serde_json::from_str(&content)?;
            if let Some(config) = db.import_snapshot(&snapshot, &Config::load()?)? {
                config.save()?;
            }
            println!("Backup restored from {}", file.display());
        }
    }
    Ok(())
}
