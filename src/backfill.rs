//! Point a notification at every advisor who is also a registered user.
//!
//! Advisors appear in the participant export only by name. A participant whose
//! "first last" equals an advisor name is taken to be that advisor, and their
//! user id goes on the notification's recipient list.

use log::{info, warn};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::Session;
use crate::error::Result;
use crate::matching::{AdvisorMatches, Participant};
use crate::repository::{replace_notification_recipients, user_id_by_tsa_id};

pub const DEFAULT_NOTIFICATION_ID: &str = "c74a9902-ac59-44c0-95bc-6d7c9fd2eeee";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParticipantRow {
    #[serde(rename = "AdvisorName", default)]
    pub advisor_name: String,
    #[serde(rename = "First Name", default)]
    pub first_name: String,
    #[serde(rename = "Last Name", default)]
    pub last_name: String,
    #[serde(rename = "Participant ID", default)]
    pub participant_id: String,
}

impl ParticipantRow {
    fn as_participant(&self) -> Participant<'_> {
        Participant {
            advisor_name: &self.advisor_name,
            first_name: &self.first_name,
            last_name: &self.last_name,
            participant_id: &self.participant_id,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BackfillSummary {
    pub advisors: usize,
    pub participant_ids: usize,
    pub user_ids: Vec<Uuid>,
    pub notification_found: bool,
}

/// Replace the recipients of `notification_id` with the advisors found in
/// `rows`. Re-running overwrites the list rather than appending to it.
pub fn backfill(
    session: &mut Session,
    rows: &[ParticipantRow],
    notification_id: &Uuid,
) -> Result<BackfillSummary> {
    let participants: Vec<Participant<'_>> = rows.iter().map(ParticipantRow::as_participant).collect();
    let matches = AdvisorMatches::collect(&participants);
    let participant_ids = matches.all_ids();

    let tx = session.transaction()?;
    let mut user_ids = Vec::new();
    for raw in &participant_ids {
        let Ok(tsa_id) = raw.parse::<i64>() else {
            warn!("could not convert participant id {raw:?} to an integer, skipping");
            continue;
        };
        match user_id_by_tsa_id(&tx, tsa_id)? {
            Some(id) => user_ids.push(Uuid::parse_str(&id)?),
            None => info!("advisor participant {tsa_id} has no user account"),
        }
    }

    let notification_found = replace_notification_recipients(&tx, notification_id, &user_ids)?;
    tx.commit()?;

    if !notification_found {
        warn!("notification {notification_id} does not exist, nothing updated");
    }
    info!("found {} unique advisors", matches.advisors.len());
    info!("collected {} participant ids associated with advisors", participant_ids.len());
    info!("updated notification {notification_id} with {} user ids", user_ids.len());

    Ok(BackfillSummary {
        advisors: matches.advisors.len(),
        participant_ids: participant_ids.len(),
        user_ids,
        notification_found,
    })
}
