mod backup;
mod config;
pub mod database;
pub mod migrations;

pub use backup::{FlatMeetingConfig, Snapshot, SnapshotConfig};
pub use config::Config;
pub use database::Database;

use std::path::PathBuf;

use crate::error::DatabaseError;

/// Returns the data directory, creating it if needed.
///
/// `ROLLCALL_DATA_DIR` wins when set. Otherwise `~/.config/rollcall`, or
/// `~/.config/rollcall-dev` with `ROLLCALL_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, DatabaseError> {
    let dir = match std::env::var_os("ROLLCALL_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ROLLCALL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("rollcall-dev")
            } else {
                base_dir.join("rollcall")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(DatabaseError::DataDir)?;
    Ok(dir)
}
