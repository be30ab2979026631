//! Insert and lookup statements for the rows the jobs write besides the
//! natural-keyed schools and events.

use chrono::NaiveDateTime;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub tsa_id: i64,
    pub short_name: String,
    pub full_name: String,
    pub email: Option<String>,
    pub school_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewAgendaItem {
    pub event_id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub location: String,
}

pub fn user_exists(conn: &Connection, tsa_id: i64) -> Result<bool> {
    Ok(user_id_by_tsa_id(conn, tsa_id)?.is_some())
}

pub fn user_id_by_tsa_id(conn: &Connection, tsa_id: i64) -> Result<Option<String>> {
    let id = conn
        .query_row(
            "SELECT id FROM users WHERE tsa_id = ?1",
            [tsa_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Insert a user; `None` when a user with the same external id already exists.
pub fn insert_user(conn: &Connection, user: &NewUser) -> Result<Option<Uuid>> {
    let id = Uuid::new_v4();
    let inserted: Option<String> = conn
        .query_row(
            "INSERT INTO users (id, tsa_id, short_name, full_name, email, school_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (tsa_id) DO NOTHING
             RETURNING id",
            params![
                id.to_string(),
                user.tsa_id,
                user.short_name,
                user.full_name,
                user.email,
                user.school_id.to_string(),
            ],
            |row| row.get(0),
        )
        .optional()?;
    Ok(inserted.map(|_| id))
}

/// Register a user for an event. Returns false if the link already existed.
pub fn link_user_event(conn: &Connection, user_id: &Uuid, event_id: &Uuid) -> Result<bool> {
    let changed = conn.execute(
        "INSERT INTO user_event (user_id, event_id) VALUES (?1, ?2)
         ON CONFLICT (user_id, event_id) DO NOTHING",
        params![user_id.to_string(), event_id.to_string()],
    )?;
    Ok(changed > 0)
}

/// Put an event on a user's personal agenda. Returns false if already there.
pub fn link_user_agenda(conn: &Connection, user_id: &Uuid, event_id: &Uuid) -> Result<bool> {
    let changed = conn.execute(
        "INSERT INTO user_agenda (user_id, event_id) VALUES (?1, ?2)
         ON CONFLICT (user_id, event_id) DO NOTHING",
        params![user_id.to_string(), event_id.to_string()],
    )?;
    Ok(changed > 0)
}

/// Placeholder auth token with a random key and no expiry.
pub fn insert_user_token(conn: &Connection, user_id: &Uuid) -> Result<i64> {
    let key = Uuid::new_v4().simple().to_string();
    let id = conn.query_row(
        "INSERT INTO user_tokens (user_id, key) VALUES (?1, ?2) RETURNING id",
        params![user_id.to_string(), key],
        |row| row.get(0),
    )?;
    Ok(id)
}

pub fn agenda_exists_for_event(conn: &Connection, event_id: &Uuid) -> Result<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT id FROM agenda WHERE event_id = ?1 LIMIT 1",
            [event_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn insert_agenda_item(conn: &Connection, item: &NewAgendaItem) -> Result<Uuid> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO agenda (id, event_id, title, description, date, end_time, location)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id.to_string(),
            item.event_id.to_string(),
            item.title,
            item.description,
            item.date,
            item.end_time,
            item.location,
        ],
    )?;
    debug!("created agenda item {} for event {}", id, item.event_id);
    Ok(id)
}

/// Overwrite a notification's recipient list. Returns false if no
/// notification has that id.
pub fn replace_notification_recipients(
    conn: &Connection,
    notification_id: &Uuid,
    user_ids: &[Uuid],
) -> Result<bool> {
    let encoded = serde_json::to_string(user_ids)?;
    let changed = conn.execute(
        "UPDATE notifications SET userids = ?1 WHERE id = ?2",
        params![encoded, notification_id.to_string()],
    )?;
    Ok(changed > 0)
}

pub fn notification_recipients(conn: &Connection, notification_id: &Uuid) -> Result<Option<Vec<Uuid>>> {
    let encoded: Option<String> = conn
        .query_row(
            "SELECT userids FROM notifications WHERE id = ?1",
            [notification_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match encoded {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Session;
    use crate::resolver::{resolve_or_create, NewEvent, NewSchool};
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn school(session: &Session) -> Uuid {
        let mut rng = StdRng::seed_from_u64(3);
        resolve_or_create(session.conn(), &NewSchool::new(2222, "NCSSM", &mut rng)).unwrap()
    }

    fn user(tsa_id: i64, school_id: Uuid) -> NewUser {
        NewUser {
            tsa_id,
            short_name: "Ada".into(),
            full_name: "Ada Lovelace".into(),
            email: None,
            school_id,
        }
    }

    #[test]
    fn duplicate_user_is_skipped() {
        let session = Session::open_in_memory().unwrap();
        let school_id = school(&session);

        let created = insert_user(session.conn(), &user(20000001, school_id)).unwrap();
        assert!(created.is_some());
        assert!(insert_user(session.conn(), &user(20000001, school_id)).unwrap().is_none());
        assert_eq!(session.count_rows("users").unwrap(), 1);
        assert!(user_exists(session.conn(), 20000001).unwrap());
        assert_eq!(
            user_id_by_tsa_id(session.conn(), 20000001).unwrap(),
            created.map(|id| id.to_string())
        );
    }

    #[test]
    fn links_are_unique_per_pair() {
        let session = Session::open_in_memory().unwrap();
        let school_id = school(&session);
        let user_id = insert_user(session.conn(), &user(1, school_id)).unwrap().unwrap();
        let event_id =
            resolve_or_create(session.conn(), &NewEvent::placeholder("Debate", Duration::zero())).unwrap();

        assert!(link_user_event(session.conn(), &user_id, &event_id).unwrap());
        assert!(!link_user_event(session.conn(), &user_id, &event_id).unwrap());
        assert!(link_user_agenda(session.conn(), &user_id, &event_id).unwrap());
        assert!(!link_user_agenda(session.conn(), &user_id, &event_id).unwrap());
        assert_eq!(session.count_rows("user_event").unwrap(), 1);
        assert_eq!(session.count_rows("user_agenda").unwrap(), 1);
    }

    #[test]
    fn recipients_are_replaced_not_merged() {
        let session = Session::open_in_memory().unwrap();
        let notification = Uuid::new_v4();
        session.ensure_notification(&notification, "Advisors").unwrap();

        let first = vec![Uuid::new_v4(), Uuid::new_v4()];
        let second = vec![Uuid::new_v4()];
        assert!(replace_notification_recipients(session.conn(), &notification, &first).unwrap());
        assert!(replace_notification_recipients(session.conn(), &notification, &second).unwrap());
        assert_eq!(
            notification_recipients(session.conn(), &notification).unwrap(),
            Some(second)
        );

        let missing = Uuid::new_v4();
        assert!(!replace_notification_recipients(session.conn(), &missing, &first).unwrap());
        assert_eq!(notification_recipients(session.conn(), &missing).unwrap(), None);
    }
}
