//! Synthetic users for load-testing the registration backend.
//!
//! Names and event titles are mined from a real participant export; external
//! ids, emails and school assignments are random.

use chrono::Duration;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::db::Session;
use crate::error::{Result, SeedError};
use crate::repository::{insert_user, insert_user_token, link_user_event, user_exists, NewUser};
use crate::resolver::{resolve_or_create, NewEvent, NewSchool};
use crate::source::present;

pub const DEFAULT_USER_COUNT: usize = 5000;
pub const EMAIL_DOMAIN: &str = "prorickey.xyz";

/// Schools every synthetic user is drawn from: (chapter id, name).
pub const SCHOOL_POOL: [(i64, &str); 2] = [
    (2222, "NC School Of Science & Math"),
    (2221, "Panther Creek High School"),
];

const MAX_EVENTS_PER_USER: usize = 5;
const EMAIL_LOCAL_LEN: usize = 5;
const EMAIL_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Deserialize)]
pub struct ReferenceRow {
    #[serde(rename = "First Name", default)]
    pub first_name: Option<String>,
    #[serde(rename = "Last Name", default)]
    pub last_name: Option<String>,
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

impl ReferenceRow {
    fn events(&self) -> [&Option<String>; 5] {
        [&self.event1, &self.event2, &self.event3, &self.event4, &self.event5]
    }
}

/// Pools the generator samples from.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
    /// Distinct event titles in first-seen order.
    pub events: Vec<String>,
}

impl ReferenceData {
    pub fn from_rows(rows: &[ReferenceRow]) -> Result<Self> {
        let mut first_names = Vec::new();
        let mut last_names = Vec::new();
        let mut events: Vec<String> = Vec::new();

        for row in rows {
            if let Some(first) = present(&row.first_name) {
                first_names.push(first.to_string());
            }
            if let Some(last) = present(&row.last_name) {
                last_names.push(last.to_string());
            }
            for event in row.events().into_iter().filter_map(present) {
                if !events.iter().any(|known| known == event) {
                    events.push(event.to_string());
                }
            }
        }

        if first_names.is_empty() {
            return Err(SeedError::EmptyReferenceData("first names"));
        }
        if last_names.is_empty() {
            return Err(SeedError::EmptyReferenceData("last names"));
        }
        if events.is_empty() {
            return Err(SeedError::EmptyReferenceData("events"));
        }

        Ok(ReferenceData {
            first_names,
            last_names,
            events,
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub requested: usize,
    pub users_created: usize,
    /// Indices abandoned because the drawn external id was taken.
    pub collisions: usize,
    pub event_links: usize,
}

/// External registration id: "2" followed by seven random digits.
pub fn generate_tsa_id<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    20_000_000 + rng.gen_range(1_000_000..=9_999_999)
}

pub fn generate_email<R: Rng + ?Sized>(rng: &mut R) -> String {
    let local: String = (0..EMAIL_LOCAL_LEN)
        .filter_map(|_| EMAIL_CHARSET.choose(rng).map(|b| *b as char))
        .collect();
    format!("{local}@{EMAIL_DOMAIN}")
}

fn pick<'a, R: Rng + ?Sized>(pool: &'a [String], rng: &mut R, what: &'static str) -> Result<&'a str> {
    pool.choose(rng)
        .map(String::as_str)
        .ok_or(SeedError::EmptyReferenceData(what))
}

/// Generate up to `count` users in a single transaction.
///
/// An index whose drawn external id already exists is abandoned, not
/// retried, so fewer than `count` users may be created.
pub fn generate<R: Rng + ?Sized>(
    session: &mut Session,
    reference: &ReferenceData,
    count: usize,
    rng: &mut R,
) -> Result<GenerateSummary> {
    let mut summary = GenerateSummary {
        requested: count,
        ..Default::default()
    };
    let tx = session.transaction()?;

    for index in 0..count {
        let tsa_id = generate_tsa_id(rng);
        if user_exists(&tx, tsa_id)? {
            debug!("index {index}: external id {tsa_id} already taken, skipping");
            summary.collisions += 1;
            continue;
        }

        let first = pick(&reference.first_names, rng, "first names")?;
        let last = pick(&reference.last_names, rng, "last names")?;
        let initial = first.chars().next().map(String::from).unwrap_or_default();

        let (school_tsa_id, school_name) = *SCHOOL_POOL
            .choose(rng)
            .ok_or(SeedError::EmptyReferenceData("schools"))?;
        let school_id = resolve_or_create(&tx, &NewSchool::new(school_tsa_id, school_name, rng))?;

        let user = NewUser {
            tsa_id,
            short_name: format!("{initial}.{last}"),
            full_name: format!("{first} {last}"),
            email: Some(generate_email(rng)),
            school_id,
        };
        let Some(user_id) = insert_user(&tx, &user)? else {
            summary.collisions += 1;
            continue;
        };

        for _ in 0..rng.gen_range(1..=MAX_EVENTS_PER_USER) {
            let name = pick(&reference.events, rng, "events")?;
            let event_id = resolve_or_create(&tx, &NewEvent::placeholder(name, Duration::zero()))?;
            if link_user_event(&tx, &user_id, &event_id)? {
                summary.event_links += 1;
            }
        }

        insert_user_token(&tx, &user_id)?;
        summary.users_created += 1;
    }

    tx.commit()?;
    info!(
        "generated {} of {} users ({} id collisions, {} event registrations)",
        summary.users_created, summary.requested, summary.collisions, summary.event_links
    );
    Ok(summary)
}
