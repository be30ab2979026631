//! Lookup-or-create for entities identified by a natural key.

use chrono::{Duration, NaiveDateTime, Utc};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use uuid::Uuid;

use crate::error::Result;

pub const DEFAULT_EVENT_LOCATION: &str = "Conference Center";

const PRIVATE_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PRIVATE_CODE_LEN: usize = 6;

/// A row that is unique on one column other than its id.
///
/// `TABLE` and the column names are spliced into SQL and must be trusted
/// identifiers; values always travel as bound parameters.
pub trait NaturalKeyed {
    const TABLE: &'static str;
    const KEY_COLUMN: &'static str;

    fn key(&self) -> &dyn ToSql;

    /// Columns written only when the row is created.
    fn attributes(&self) -> Vec<(&'static str, &dyn ToSql)>;
}

/// Id of the row holding `entity`'s natural key, inserting it first if absent.
///
/// The insert is conflict-skipping; when it is a no-op the existing id is
/// looked up by key, so repeated calls always land on the same row and the
/// attributes of later calls are ignored.
pub fn resolve_or_create<E: NaturalKeyed>(conn: &Connection, entity: &E) -> Result<Uuid> {
    let attributes = entity.attributes();

    let mut columns = vec!["id", E::KEY_COLUMN];
    columns.extend(attributes.iter().map(|(column, _)| *column));
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let insert = format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders}) \
         ON CONFLICT ({key}) DO NOTHING RETURNING id",
        table = E::TABLE,
        columns = columns.join(", "),
        key = E::KEY_COLUMN,
    );

    let new_id = Uuid::new_v4().to_string();
    let mut values: Vec<&dyn ToSql> = Vec::with_capacity(columns.len());
    values.push(&new_id);
    values.push(entity.key());
    values.extend(attributes.iter().map(|(_, value)| *value));

    let inserted: Option<String> = conn
        .query_row(&insert, values.as_slice(), |row| row.get(0))
        .optional()?;

    let id = match inserted {
        Some(id) => {
            debug!("created {} row {}", E::TABLE, id);
            id
        }
        None => conn.query_row(
            &format!(
                "SELECT id FROM {} WHERE {} = ?1",
                E::TABLE,
                E::KEY_COLUMN
            ),
            params![entity.key()],
            |row| row.get(0),
        )?,
    };

    Ok(Uuid::parse_str(&id)?)
}

/// Random 6-character access code of uppercase letters and digits.
pub fn generate_private_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..PRIVATE_CODE_LEN)
        .filter_map(|_| PRIVATE_CODE_CHARSET.choose(rng).map(|b| *b as char))
        .collect()
}

/// A school keyed by its external chapter id.
#[derive(Debug, Clone)]
pub struct NewSchool {
    pub tsa_id: i64,
    pub name: String,
    pub private_code: String,
}

impl NewSchool {
    pub fn new<R: Rng + ?Sized>(tsa_id: i64, name: impl Into<String>, rng: &mut R) -> Self {
        NewSchool {
            tsa_id,
            name: name.into(),
            private_code: generate_private_code(rng),
        }
    }
}

impl NaturalKeyed for NewSchool {
    const TABLE: &'static str = "school";
    const KEY_COLUMN: &'static str = "tsa_id";

    fn key(&self) -> &dyn ToSql {
        &self.tsa_id
    }

    fn attributes(&self) -> Vec<(&'static str, &dyn ToSql)> {
        vec![
            ("school_name", &self.name as &dyn ToSql),
            ("private_code", &self.private_code as &dyn ToSql),
        ]
    }
}

/// An event keyed by its name.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub location: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

impl NewEvent {
    /// Event at the default location whose real schedule is not known yet:
    /// starts now and lasts `length`.
    pub fn placeholder(name: impl Into<String>, length: Duration) -> Self {
        let now = Utc::now().naive_utc();
        NewEvent {
            name: name.into(),
            location: DEFAULT_EVENT_LOCATION.to_string(),
            start_time: now,
            end_time: now + length,
        }
    }
}

impl NaturalKeyed for NewEvent {
    const TABLE: &'static str = "event";
    const KEY_COLUMN: &'static str = "name";

    fn key(&self) -> &dyn ToSql {
        &self.name
    }

    fn attributes(&self) -> Vec<(&'static str, &dyn ToSql)> {
        vec![
            ("location", &self.location as &dyn ToSql),
            ("start_time", &self.start_time as &dyn ToSql),
            ("end_time", &self.end_time as &dyn ToSql),
        ]
    }
}
