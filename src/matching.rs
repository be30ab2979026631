//! Pure string handling used by the importers: event-name extraction,
//! advisor/participant matching and schedule timestamp composition.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

pub const SCHEDULE_DATE_FORMAT: &str = "%m/%d/%Y";
pub const SCHEDULE_TIME_FORMAT: &str = "%I:%M:%S %p";

fn re_team_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)\s+(?:Team|Group)?\s*\d+$").unwrap())
}

/// Canonical event name for a roster entry such as `"Debate Team 12"`.
///
/// Entries without a trailing number are not event registrations and yield
/// `None`; they are dropped, not passed through.
pub fn canonical_event_name(raw: &str) -> Option<String> {
    let caps = re_team_suffix().captures(raw.trim())?;
    let name = caps.get(1)?.as_str().trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

pub fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

/// Combine a schedule date (`03/14/2025`) and a 12-hour time (`09:30:00 AM`).
pub fn schedule_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), SCHEDULE_DATE_FORMAT).ok()?;
    let time = NaiveTime::parse_from_str(time.trim(), SCHEDULE_TIME_FORMAT).ok()?;
    Some(date.and_time(time))
}

/// One participant row as seen by advisor matching.
#[derive(Debug, Clone, Copy)]
pub struct Participant<'a> {
    pub advisor_name: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub participant_id: &'a str,
}

/// Participant IDs of people whose full name equals an advisor name.
#[derive(Debug, Default)]
pub struct AdvisorMatches {
    /// Distinct advisor names in first-seen order.
    pub advisors: Vec<String>,
    pub ids_by_advisor: HashMap<String, Vec<String>>,
}

impl AdvisorMatches {
    /// Two passes over `participants`: gather advisor names, then record
    /// every participant whose "first last" matches one exactly.
    pub fn collect(participants: &[Participant<'_>]) -> Self {
        let mut matches = AdvisorMatches::default();

        for p in participants {
            let advisor = p.advisor_name.trim();
            if !advisor.is_empty() && !matches.ids_by_advisor.contains_key(advisor) {
                matches.advisors.push(advisor.to_string());
                matches.ids_by_advisor.insert(advisor.to_string(), Vec::new());
            }
        }

        for p in participants {
            let name = full_name(p.first_name, p.last_name);
            let id = p.participant_id.trim();
            if id.is_empty() {
                continue;
            }
            if let Some(ids) = matches.ids_by_advisor.get_mut(&name) {
                if !ids.iter().any(|existing| existing == id) {
                    ids.push(id.to_string());
                }
            }
        }

        matches
    }

    /// Every collected participant ID, deduplicated across advisors.
    pub fn all_ids(&self) -> BTreeSet<&str> {
        self.ids_by_advisor
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }
}
