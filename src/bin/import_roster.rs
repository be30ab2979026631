//! Import the participant roster export into users, schools and events.
//!
//! Usage:
//! ```bash
//! cargo run --bin import_roster
//! ```
use std::path::Path;

use nctsa_seed::config::{init_logging, Settings};
use nctsa_seed::roster::{self, RosterRow};
use nctsa_seed::source::read_csv;
use nctsa_seed::{Result, Session};

const ROSTER_CSV: &str = "./participants.csv";

fn main() -> Result<()> {
    init_logging();
    let settings = Settings::from_env();

    let rows: Vec<RosterRow> = read_csv(Path::new(ROSTER_CSV))?;
    let mut session = Session::open(&settings.database_path)?;
    roster::import(&mut session, &rows, &mut rand::thread_rng())?;
    session.close()
}
