//! Participant roster import.
//!
//! Each roster row becomes a user attached to their chapter's school, plus a
//! registration and a personal agenda entry for every competitive event they
//! entered. Rows commit independently, so a failure part-way through keeps
//! everything imported before it.

use chrono::Duration;
use log::{info, warn};
use rand::Rng;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::Session;
use crate::error::Result;
use crate::matching::{canonical_event_name, full_name};
use crate::repository::{insert_user, link_user_agenda, link_user_event, NewUser};
use crate::resolver::{resolve_or_create, NewEvent, NewSchool};
use crate::source::present;

pub const PLACEHOLDER_FIRST_NAME: &str = "Judge/Volunteer";
pub const PLACEHOLDER_LAST_NAME: &str = "TSA";

#[derive(Debug, Clone, Deserialize)]
pub struct RosterRow {
    #[serde(rename = "Participant ID", default)]
    pub participant_id: Option<String>,
    #[serde(rename = "First Name", default)]
    pub first_name: Option<String>,
    #[serde(rename = "Last Name", default)]
    pub last_name: Option<String>,
    #[serde(rename = "School", default)]
    pub school: Option<String>,
    #[serde(rename = "ChapterID", default)]
    pub chapter_id: Option<String>,
    #[serde(rename = "Event1", default)]
    pub event1: Option<String>,
    #[serde(rename = "Event2", default)]
    pub event2: Option<String>,
    #[serde(rename = "Event3", default)]
    pub event3: Option<String>,
    #[serde(rename = "Event4", default)]
    pub event4: Option<String>,
    #[serde(rename = "Event5", default)]
    pub event5: Option<String>,
}

impl RosterRow {
    /// Canonical names of the events on this row; entries without a team or
    /// group number are dropped.
    pub fn event_names(&self) -> Vec<String> {
        [&self.event1, &self.event2, &self.event3, &self.event4, &self.event5]
            .into_iter()
            .filter_map(present)
            .filter_map(canonical_event_name)
            .collect()
    }

    /// (short name, full name), substituting the volunteer placeholder when
    /// the first name is blank.
    pub fn display_names(&self) -> (String, String) {
        match present(&self.first_name) {
            Some(first) => {
                let last = present(&self.last_name).unwrap_or_default();
                (first.to_string(), full_name(first, last))
            }
            None => (
                PLACEHOLDER_FIRST_NAME.to_string(),
                full_name(PLACEHOLDER_FIRST_NAME, PLACEHOLDER_LAST_NAME),
            ),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RosterSummary {
    pub rows: usize,
    pub users_created: usize,
    pub duplicate_users: usize,
    pub invalid_rows: usize,
    pub registrations: usize,
}

fn parse_id(cell: &Option<String>) -> Option<i64> {
    present(cell)?.parse().ok()
}

/// Import roster rows in file order, committing after each one.
pub fn import<R: Rng + ?Sized>(
    session: &mut Session,
    rows: &[RosterRow],
    rng: &mut R,
) -> Result<RosterSummary> {
    let mut summary = RosterSummary {
        rows: rows.len(),
        ..Default::default()
    };

    for (line, row) in rows.iter().enumerate() {
        let Some(tsa_id) = parse_id(&row.participant_id) else {
            warn!(
                "row {}: unusable participant id {:?}, skipping",
                line + 1,
                row.participant_id
            );
            summary.invalid_rows += 1;
            continue;
        };
        let Some(chapter_id) = parse_id(&row.chapter_id) else {
            warn!(
                "row {}: participant {tsa_id} has unusable chapter id {:?}, skipping",
                line + 1,
                row.chapter_id
            );
            summary.invalid_rows += 1;
            continue;
        };

        let tx = session.transaction()?;

        let school_name = present(&row.school).unwrap_or_default();
        let school_id = resolve_or_create(&tx, &NewSchool::new(chapter_id, school_name, rng))?;

        let (short_name, full_name) = row.display_names();
        let user = NewUser {
            tsa_id,
            short_name,
            full_name,
            email: None,
            school_id,
        };
        let Some(user_id) = insert_user(&tx, &user)? else {
            info!("participant {tsa_id} already imported, skipping");
            summary.duplicate_users += 1;
            continue;
        };

        for event_name in row.event_names() {
            let event_id = resolve_or_create(&tx, &NewEvent::placeholder(event_name, Duration::hours(1)))?;
            if register(&tx, &user_id, &event_id)? {
                summary.registrations += 1;
            }
        }

        tx.commit()?;
        summary.users_created += 1;
    }

    info!(
        "roster import: {} users created from {} rows ({} already present, {} invalid, {} registrations)",
        summary.users_created, summary.rows, summary.duplicate_users, summary.invalid_rows, summary.registrations
    );
    Ok(summary)
}

fn register(conn: &rusqlite::Connection, user_id: &Uuid, event_id: &Uuid) -> Result<bool> {
    let registered = link_user_event(conn, user_id, event_id)?;
    link_user_agenda(conn, user_id, event_id)?;
    Ok(registered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::read_csv_from;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const HEADER: &str = "Participant ID,First Name,Last Name,School,ChapterID,Event1,Event2,Event3,Event4,Event5\n";

    fn rows(body: &str) -> Vec<RosterRow> {
        read_csv_from(format!("{HEADER}{body}").as_bytes()).unwrap()
    }

    fn names_of(session: &Session, tsa_id: i64) -> (String, String) {
        session
            .conn()
            .query_row(
                "SELECT short_name, full_name FROM users WHERE tsa_id = ?1",
                [tsa_id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap()
    }

    #[test]
    fn event_names_are_normalized_and_filtered() {
        let data = rows("1,Ada,Lovelace,NCSSM,2222,Debate Team 12,Coding 3,Robotics,,Chess Group 2\n");
        assert_eq!(data[0].event_names(), vec!["Debate", "Coding", "Chess"]);
    }

    #[test]
    fn imports_users_schools_and_events() {
        let mut session = Session::open_in_memory().unwrap();
        let data = rows(
            "1001,Ada,Lovelace,NCSSM,2222,Debate Team 12,Coding 3,Robotics,,\n\
             1002,Alan,Turing,NCSSM,2222,Coding 4,,,,\n\
             1003,Grace,Hopper,Panther Creek,2221,Debate Team 1,Debate Team 2,,,\n",
        );
        let summary = import(&mut session, &data, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(summary.users_created, 3);
        assert_eq!(session.count_rows("school").unwrap(), 2);
        assert_eq!(session.count_rows("event").unwrap(), 2);
        assert_eq!(session.count_rows("user_event").unwrap(), 4);
        assert_eq!(session.count_rows("user_agenda").unwrap(), 4);
        assert_eq!(summary.registrations, 4);
        assert_eq!(names_of(&session, 1001), ("Ada".into(), "Ada Lovelace".into()));
    }

    #[test]
    fn blank_first_name_becomes_volunteer() {
        let mut session = Session::open_in_memory().unwrap();
        let data = rows("5000,,Smith,NCSSM,2222,,,,,\n");
        import(&mut session, &data, &mut StdRng::seed_from_u64(2)).unwrap();

        assert_eq!(
            names_of(&session, 5000),
            ("Judge/Volunteer".into(), "Judge/Volunteer TSA".into())
        );
    }

    #[test]
    fn reimport_skips_existing_users() {
        let mut session = Session::open_in_memory().unwrap();
        let data = rows("1001,Ada,Lovelace,NCSSM,2222,Debate Team 12,,,,\n");
        import(&mut session, &data, &mut StdRng::seed_from_u64(3)).unwrap();
        let again = import(&mut session, &data, &mut StdRng::seed_from_u64(4)).unwrap();

        assert_eq!(again.users_created, 0);
        assert_eq!(again.duplicate_users, 1);
        for table in ["users", "school", "event", "user_event", "user_agenda"] {
            assert_eq!(session.count_rows(table).unwrap(), 1, "{table}");
        }
    }

    #[test]
    fn invalid_ids_are_skipped_not_fatal() {
        let mut session = Session::open_in_memory().unwrap();
        let data = rows(
            "abc,Ada,Lovelace,NCSSM,2222,,,,,\n\
             1002,Alan,Turing,NCSSM,,,,,,\n\
             1003,Grace,Hopper,NCSSM,2222,,,,,\n",
        );
        let summary = import(&mut session, &data, &mut StdRng::seed_from_u64(5)).unwrap();

        assert_eq!(summary.invalid_rows, 2);
        assert_eq!(summary.users_created, 1);
        assert_eq!(session.count_rows("users").unwrap(), 1);
    }

    #[test]
    fn failed_row_rolls_back_but_earlier_rows_persist() {
        let mut session = Session::open_in_memory().unwrap();
        session
            .conn()
            .execute_batch(
                "CREATE TRIGGER refuse_agenda_link BEFORE INSERT ON user_agenda
                 WHEN NEW.user_id = (SELECT id FROM users WHERE tsa_id = 2)
                 BEGIN SELECT RAISE(ABORT, 'agenda link refused'); END;",
            )
            .unwrap();
        let data = rows(
            "1,Ada,Lovelace,NCSSM,2222,Debate Team 1,,,,\n\
             2,Alan,Turing,Panther Creek,2221,Coding 3,,,,\n\
             3,Grace,Hopper,Green Hope,2220,Chess Group 2,,,,\n",
        );

        assert!(import(&mut session, &data, &mut StdRng::seed_from_u64(6)).is_err());
        for table in ["users", "school", "event", "user_event", "user_agenda"] {
            assert_eq!(session.count_rows(table).unwrap(), 1, "{table}");
        }
        let school: i64 = session
            .conn()
            .query_row("SELECT tsa_id FROM school", [], |r| r.get(0))
            .unwrap();
        assert_eq!(school, 2222);
        let event: String = session
            .conn()
            .query_row("SELECT name FROM event", [], |r| r.get(0))
            .unwrap();
        assert_eq!(event, "Debate");
    }
}
