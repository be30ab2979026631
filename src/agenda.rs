//! Event schedule import: one agenda item per event.

use chrono::Duration;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::db::Session;
use crate::error::Result;
use crate::matching::schedule_timestamp;
use crate::repository::{agenda_exists_for_event, insert_agenda_item, NewAgendaItem};
use crate::resolver::{resolve_or_create, NewEvent};
use crate::source::present;

pub const UNKNOWN_LOCATION: &str = "TBD";

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRow {
    #[serde(rename = "Event", default)]
    pub event: Option<String>,
    #[serde(rename = "SchDescription", default)]
    pub description: Option<String>,
    #[serde(rename = "StartDate", default)]
    pub start_date: Option<String>,
    #[serde(rename = "StartTime", default)]
    pub start_time: Option<String>,
    #[serde(rename = "EndTime", default)]
    pub end_time: Option<String>,
    #[serde(rename = "BlockRoom", default)]
    pub block_room: Option<String>,
    #[serde(rename = "HoldRoom", default)]
    pub hold_room: Option<String>,
}

impl ScheduleRow {
    pub fn location(&self) -> &str {
        present(&self.block_room)
            .or_else(|| present(&self.hold_room))
            .unwrap_or(UNKNOWN_LOCATION)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AgendaSummary {
    pub rows: usize,
    pub items_created: usize,
    /// Rows for events that already have an agenda item.
    pub already_scheduled: usize,
    pub incomplete_rows: usize,
}

/// Import schedule rows in a single transaction.
///
/// The first usable row for an event creates its agenda item; later rows for
/// the same event are skipped, existing items are never updated.
pub fn import(session: &mut Session, rows: &[ScheduleRow]) -> Result<AgendaSummary> {
    let mut summary = AgendaSummary {
        rows: rows.len(),
        ..Default::default()
    };
    let tx = session.transaction()?;

    for (line, row) in rows.iter().enumerate() {
        let (Some(event_name), Some(description), Some(date)) = (
            present(&row.event),
            present(&row.description),
            present(&row.start_date),
        ) else {
            warn!("row {}: missing event, description or date, skipping", line + 1);
            summary.incomplete_rows += 1;
            continue;
        };

        let start = present(&row.start_time).and_then(|time| schedule_timestamp(date, time));
        let end = present(&row.end_time).and_then(|time| schedule_timestamp(date, time));
        let (Some(start), Some(end)) = (start, end) else {
            warn!(
                "row {}: cannot read schedule for {event_name} ({date} {:?}-{:?}), skipping",
                line + 1,
                row.start_time,
                row.end_time
            );
            summary.incomplete_rows += 1;
            continue;
        };

        let event_id = resolve_or_create(&tx, &NewEvent::placeholder(event_name, Duration::zero()))?;
        if agenda_exists_for_event(&tx, &event_id)? {
            debug!("row {}: {event_name} already on the agenda", line + 1);
            summary.already_scheduled += 1;
            continue;
        }

        insert_agenda_item(
            &tx,
            &NewAgendaItem {
                event_id,
                title: event_name.to_string(),
                description: description.to_string(),
                date: start,
                end_time: end,
                location: row.location().to_string(),
            },
        )?;
        info!("added agenda item for event: {event_name}, {description}");
        summary.items_created += 1;
    }

    tx.commit()?;
    info!(
        "agenda import: {} items created from {} rows ({} already scheduled, {} incomplete)",
        summary.items_created, summary.rows, summary.already_scheduled, summary.incomplete_rows
    );
    Ok(summary)
}
