//! Fill the database with synthetic users for load testing.
//!
//! Usage:
//! ```bash
//! cargo run --bin generate_data
//! ```
//!
//! Names and event titles are sampled from `data.csv` (a participant export
//! with `First Name`, `Last Name` and `Event1`..`Event5` columns).
use std::path::Path;

use nctsa_seed::config::{init_logging, Settings};
use nctsa_seed::generator::{self, ReferenceData, ReferenceRow, DEFAULT_USER_COUNT};
use nctsa_seed::source::read_csv;
use nctsa_seed::{Result, Session};

const REFERENCE_CSV: &str = "./data.csv";

fn main() -> Result<()> {
    init_logging();
    let settings = Settings::from_env();

    let rows: Vec<ReferenceRow> = read_csv(Path::new(REFERENCE_CSV))?;
    let reference = ReferenceData::from_rows(&rows)?;

    let mut session = Session::open(&settings.database_path)?;
    let mut rng = rand::thread_rng();
    generator::generate(&mut session, &reference, DEFAULT_USER_COUNT, &mut rng)?;
    session.close()
}
