//! Import the event schedule export as agenda items.
//!
//! Usage:
//! ```bash
//! cargo run --bin import_agenda
//! ```
use std::path::Path;

use log::info;
use nctsa_seed::agenda::{self, ScheduleRow};
use nctsa_seed::config::{init_logging, Settings};
use nctsa_seed::source::read_csv;
use nctsa_seed::{Result, Session};

const SCHEDULE_CSV: &str = "./eventSchedule2.csv";

fn main() -> Result<()> {
    init_logging();
    let settings = Settings::from_env();

    let rows: Vec<ScheduleRow> = read_csv(Path::new(SCHEDULE_CSV))?;
    let mut session = Session::open(&settings.database_path)?;
    agenda::import(&mut session, &rows)?;
    session.close()?;

    info!("Import completed successfully!");
    Ok(())
}
