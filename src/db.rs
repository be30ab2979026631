//! Database session shared by the jobs.
//!
//! A [`Session`] owns the one SQLite connection a job uses. It is opened at
//! the start of a job, handed explicitly to every operation, and the
//! connection is released when the session is dropped, on the error path too.

use std::path::Path;

use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use uuid::Uuid;

use crate::error::{Result, SeedError};

/// Tables touched by the jobs, in dependency order.
pub const TABLES: [&str; 8] = [
    "school",
    "users",
    "event",
    "user_event",
    "user_agenda",
    "agenda",
    "user_tokens",
    "notifications",
];

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS school (
        id           TEXT PRIMARY KEY,
        tsa_id       INTEGER NOT NULL UNIQUE,
        school_name  TEXT NOT NULL,
        private_code TEXT NOT NULL,
        created_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS users (
        id         TEXT PRIMARY KEY,
        tsa_id     INTEGER NOT NULL UNIQUE,
        short_name TEXT NOT NULL,
        full_name  TEXT NOT NULL,
        email      TEXT,
        school_id  TEXT NOT NULL REFERENCES school(id),
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS event (
        id         TEXT PRIMARY KEY,
        name       TEXT NOT NULL UNIQUE,
        location   TEXT,
        start_time TEXT,
        end_time   TEXT,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS user_event (
        user_id  TEXT NOT NULL REFERENCES users(id),
        event_id TEXT NOT NULL REFERENCES event(id),
        PRIMARY KEY (user_id, event_id)
    );

    CREATE TABLE IF NOT EXISTS user_agenda (
        user_id  TEXT NOT NULL REFERENCES users(id),
        event_id TEXT NOT NULL REFERENCES event(id),
        UNIQUE (user_id, event_id)
    );

    CREATE TABLE IF NOT EXISTS agenda (
        id          TEXT PRIMARY KEY,
        event_id    TEXT NOT NULL REFERENCES event(id),
        title       TEXT NOT NULL,
        description TEXT NOT NULL,
        date        TEXT NOT NULL,
        end_time    TEXT NOT NULL,
        location    TEXT NOT NULL,
        published   INTEGER NOT NULL DEFAULT 0,
        created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS user_tokens (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL REFERENCES users(id),
        key     TEXT NOT NULL UNIQUE,
        expires TEXT
    );

    CREATE TABLE IF NOT EXISTS notifications (
        id          TEXT PRIMARY KEY,
        title       TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        date        TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        published   INTEGER NOT NULL DEFAULT 0,
        private     INTEGER NOT NULL DEFAULT 0,
        type        TEXT,
        userids     TEXT NOT NULL DEFAULT '[]',
        created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

pub struct Session {
    conn: Connection,
}

impl Session {
    /// Open (or create) the database file and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening database at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Session { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    /// Row count of one of the job tables; any name outside [`TABLES`] is
    /// rejected before it reaches SQL.
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        let Some(table) = TABLES.iter().find(|known| **known == table) else {
            return Err(SeedError::UnknownTable(table.to_string()));
        };
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert an empty notification with `id` unless one already exists.
    /// Returns whether a row was created.
    pub fn ensure_notification(&self, id: &Uuid, title: &str) -> Result<bool> {
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM notifications WHERE id = ?1",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Ok(false);
        }
        self.conn.execute(
            "INSERT INTO notifications (id, title, private) VALUES (?1, ?2, 1)",
            params![id.to_string(), title],
        )?;
        Ok(true)
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let session = Session::open_in_memory().expect("session");
        session.conn().execute_batch(SCHEMA).expect("second schema pass");
        for table in TABLES {
            assert_eq!(session.count_rows(table).expect("count"), 0, "{table}");
        }
    }

    #[test]
    fn count_rows_rejects_unknown_tables() {
        let session = Session::open_in_memory().expect("session");
        let err = session
            .count_rows("users; DROP TABLE users")
            .expect_err("unknown table");
        assert!(matches!(err, SeedError::UnknownTable(_)));
        assert!(session.count_rows("sqlite_master").is_err());
        assert_eq!(session.count_rows("users").unwrap(), 0);
    }

    #[test]
    fn ensure_notification_creates_once() {
        let session = Session::open_in_memory().expect("session");
        let id = Uuid::new_v4();
        assert!(session.ensure_notification(&id, "Advisors").unwrap());
        assert!(!session.ensure_notification(&id, "Advisors").unwrap());
        assert_eq!(session.count_rows("notifications").unwrap(), 1);

        let userids: String = session
            .conn()
            .query_row(
                "SELECT userids FROM notifications WHERE id = ?1",
                [id.to_string()],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(userids, "[]");
    }

    #[test]
    fn file_session_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seed.db");
        {
            let session = Session::open(&path).expect("open");
            session.ensure_notification(&Uuid::new_v4(), "x").unwrap();
            session.close().expect("close");
        }
        let session = Session::open(&path).expect("reopen");
        assert_eq!(session.count_rows("notifications").unwrap(), 1);
    }
}
