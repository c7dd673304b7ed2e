//! Event ordering
//!
//! [`EventOrderingService::reorder`] re-ranks the whole event collection so
//! that the supplied identifiers come first, in the supplied order. Events
//! that were not mentioned follow, keeping their previous relative order.
//! The collection is read, re-ranked and written back inside one store
//! transaction, so a concurrent create, update or delete is never undone.
//!
//! How strictly the identifier list is checked depends on [`ReorderPolicy`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use shared::models::Event;
use thiserror::Error;

use crate::db::{EventStore, StorageError};

/// Message returned when the request body does not carry an id array
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid eventIds format";

/// How the supplied identifier list is checked against the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReorderPolicy {
    /// Unknown ids are ignored, repeats keep their first position and omitted
    /// events are appended in their previous relative order.
    #[default]
    Lenient,
    /// The ids must be exactly the existing id set, each exactly once.
    Strict,
}

impl FromStr for ReorderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "invalid REORDER_POLICY '{other}', expected 'lenient' or 'strict'"
            )),
        }
    }
}

impl fmt::Display for ReorderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

#[derive(Debug, Error)]
pub enum OrderingError {
    /// The request is malformed or the ids are rejected by the policy.
    /// Nothing was written.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to persist event order: {0}")]
    Persistence(#[from] StorageError),
}

/// Extract the `eventIds` array from a request body
pub fn parse_event_ids(body: &Value) -> Result<Vec<String>, OrderingError> {
    let invalid = || OrderingError::InvalidInput(INVALID_FORMAT_MESSAGE.to_string());

    body.get("eventIds")
        .and_then(Value::as_array)
        .ok_or_else(invalid)?
        .iter()
        .map(|id| id.as_str().map(str::to_owned).ok_or_else(invalid))
        .collect()
}

/// Re-rank `events` so that `event_ids` come first in the given order.
///
/// Unknown ids are skipped and a repeated id keeps its first position. Events
/// not named keep their relative order and follow the named ones. Ranks are
/// reassigned as `0..N`.
pub fn apply_order(events: Vec<Event>, event_ids: &[String]) -> Vec<Event> {
    let index: HashMap<String, usize> = events
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id.clone(), i))
        .collect();

    let mut slots: Vec<Option<Event>> = events.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());

    for id in event_ids {
        if let Some(&i) = index.get(id.as_str())
            && let Some(event) = slots[i].take()
        {
            ordered.push(event);
        }
    }
    ordered.extend(slots.into_iter().flatten());

    for (rank, event) in ordered.iter_mut().enumerate() {
        event.display_order = rank as u32;
    }
    ordered
}

/// Check that `event_ids` is a permutation of the collection's ids
pub fn validate_permutation(events: &[Event], event_ids: &[String]) -> Result<(), OrderingError> {
    let existing: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();

    let mut seen = HashSet::new();
    let mut unknown = Vec::new();
    let mut duplicated = Vec::new();
    for id in event_ids {
        if !existing.contains(id.as_str()) {
            unknown.push(id.as_str());
        } else if !seen.insert(id.as_str()) {
            duplicated.push(id.as_str());
        }
    }
    let missing: Vec<&str> = events
        .iter()
        .map(|e| e.id.as_str())
        .filter(|id| !seen.contains(id))
        .collect();

    let mut problems = Vec::new();
    if !unknown.is_empty() {
        problems.push(format!("unknown event ids: {}", unknown.join(", ")));
    }
    if !duplicated.is_empty() {
        problems.push(format!("duplicate event ids: {}", duplicated.join(", ")));
    }
    if !missing.is_empty() {
        problems.push(format!("missing event ids: {}", missing.join(", ")));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(OrderingError::InvalidInput(format!(
            "eventIds must list every event exactly once ({})",
            problems.join("; ")
        )))
    }
}

/// Re-ranks the event collection held by the backing store
#[derive(Clone)]
pub struct EventOrderingService {
    store: Arc<dyn EventStore>,
    policy: ReorderPolicy,
}

impl EventOrderingService {
    pub fn new(store: Arc<dyn EventStore>, policy: ReorderPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> ReorderPolicy {
        self.policy
    }

    /// Apply `event_ids` as the new presentation order and persist it.
    ///
    /// Returns the full collection in its new order.
    pub fn reorder(&self, event_ids: &[String]) -> Result<Vec<Event>, OrderingError> {
        let strict = self.policy == ReorderPolicy::Strict;
        let mut plan = |events: Vec<Event>| -> Result<Vec<Event>, String> {
            if strict {
                validate_permutation(&events, event_ids).map_err(|e| e.to_string())?;
            }
            Ok(apply_order(events, event_ids))
        };

        self.store.rerank(&mut plan).map_err(|e| match e {
            StorageError::Rejected(msg) => OrderingError::InvalidInput(msg),
            other => OrderingError::Persistence(other),
        })
    }

    /// [`reorder`](Self::reorder) driven by a raw request body
    pub fn reorder_json(&self, body: &Value) -> Result<Vec<Event>, OrderingError> {
        let event_ids = parse_event_ids(body)?;
        self.reorder(&event_ids)
    }
}
