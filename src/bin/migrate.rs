//! Separate CLI tool for creating the SQLite tables the seed jobs write to.
//!
//! Usage:
//! ```bash
//! # To run migration:
//! cargo run --bin migrate
//! ```
//!
//! This binary will:
//! - Create `school`, `users`, `event`, `user_event`, `user_agenda`, `agenda`,
//!   `user_tokens` and `notifications` if they are missing. Existing data is
//!   left alone.
//! - Insert an empty, private notification with the id the backfill job
//!   targets, unless it already exists.
//! - Report how many rows each table holds.
use log::info;
use nctsa_seed::backfill::DEFAULT_NOTIFICATION_ID;
use nctsa_seed::config::{init_logging, Settings};
use nctsa_seed::db::TABLES;
use nctsa_seed::{Result, Session};
use uuid::Uuid;

const ADVISOR_NOTIFICATION_TITLE: &str = "Advisor announcements";

fn main() -> Result<()> {
    init_logging();
    let settings = Settings::from_env();

    let session = Session::open(&settings.database_path)?;
    info!("Schema ready in {}.", settings.database_path.display());

    let notification_id = Uuid::parse_str(DEFAULT_NOTIFICATION_ID)?;
    if session.ensure_notification(&notification_id, ADVISOR_NOTIFICATION_TITLE)? {
        info!("Created placeholder notification {notification_id}.");
    }

    for table in TABLES {
        info!("{table}: {} rows", session.count_rows(table)?);
    }
    session.close()
}
