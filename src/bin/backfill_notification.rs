//! Set the recipients of the advisor notification to every advisor who is
//! also a registered participant.
//!
//! Usage:
//! ```bash
//! cargo run --bin backfill_notification
//! ```
//!
//! Failures are reported on the console instead of aborting with a panic or
//! error exit.
use std::path::Path;

use log::error;
use nctsa_seed::backfill::{self, ParticipantRow, DEFAULT_NOTIFICATION_ID};
use nctsa_seed::config::{init_logging, Settings};
use nctsa_seed::source::read_csv;
use nctsa_seed::{Result, Session};
use uuid::Uuid;

const PARTICIPANTS_CSV: &str = "participants2.csv";

fn run(settings: &Settings) -> Result<()> {
    let rows: Vec<ParticipantRow> = read_csv(Path::new(PARTICIPANTS_CSV))?;
    let notification_id = Uuid::parse_str(DEFAULT_NOTIFICATION_ID)?;

    let mut session = Session::open(&settings.database_path)?;
    backfill::backfill(&mut session, &rows, &notification_id)?;
    session.close()
}

fn main() {
    init_logging();
    let settings = Settings::from_env();

    if let Err(e) = run(&settings) {
        error!("Database error: {e}");
    }
}
