//! API Response types
//!
//! Success bodies all carry `"success": true` next to their payload field.
//! Failure bodies are produced by [`crate::error::AppError`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Event;

/// `{ "success": true, "events": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub success: bool,
    pub events: Vec<Event>,
}

impl EventsResponse {
    pub fn ok(events: Vec<Event>) -> Self {
        Self {
            success: true,
            events,
        }
    }
}

/// `{ "success": true, "event": {...} }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub success: bool,
    pub event: Event,
}

impl EventResponse {
    pub fn ok(event: Event) -> Self {
        Self {
            success: true,
            event,
        }
    }
}

/// `{ "success": true, "message": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Admin session status as seen by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub success: bool,
    pub authenticated: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Admin entry view admission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminEntryResponse {
    pub success: bool,
    pub authenticated: bool,
}
