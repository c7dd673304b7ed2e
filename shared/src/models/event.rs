//! Event Model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the events diary
///
/// `display_order` ranks the event within the whole collection. After any
/// successful mutation the ranks of all events are exactly `0..N`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    /// Free-form start time as shown on the site ("8pm", "Doors 19:30")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
    pub display_order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Apply a partial update, touching `updated_at`
    pub fn apply(&mut self, update: EventUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title.trim().to_string();
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(start_time) = update.start_time {
            self.start_time = Some(start_time);
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(ticket_url) = update.ticket_url {
            self.ticket_url = Some(ticket_url);
        }
        self.updated_at = now;
    }
}

/// Create event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCreate {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub ticket_url: Option<String>,
}

/// Update event payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub ticket_url: Option<String>,
}
