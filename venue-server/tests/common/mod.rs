#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use http::{Request, Response, header};
use http_body_util::BodyExt;
use serde_json::Value;
use shared::models::{Event, EventUpdate};
use tower::ServiceExt;
use venue_server::api::build_app;
use venue_server::db::{EventStore, RankPlan, StorageError, StorageResult};
use venue_server::{Config, RedbEventStore, ServerState};

pub fn event(id: &str, order: u32) -> Event {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
    Event {
        id: id.to_string(),
        title: format!("Event {id}"),
        date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        start_time: None,
        description: None,
        image_url: None,
        ticket_url: None,
        display_order: order,
        created_at: at,
        updated_at: at,
    }
}

/// In-memory store holding `ids` ranked in the given order
pub fn seeded_store(ids: &[&str]) -> RedbEventStore {
    let store = RedbEventStore::open_in_memory().unwrap();
    for id in ids {
        store.create(event(id, 0)).unwrap();
    }
    store
}

/// App over an in-memory store seeded with `ids` ranked in the given order
pub fn app_with_events(config: &Config, ids: &[&str]) -> (Router, ServerState) {
    let store = seeded_store(ids);
    let state = ServerState::with_store(config, Arc::new(store));
    (build_app(state.clone()), state)
}

pub fn test_config() -> Config {
    Config::for_work_dir(std::env::temp_dir())
}

/// `Cookie` header value carrying a freshly granted admin session
pub fn session_cookie(state: &ServerState) -> String {
    let mut headers = http::HeaderMap::new();
    state.sessions.grant(&mut headers).unwrap();
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub fn ids(body: &Value) -> Vec<String> {
    body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect()
}

pub fn ranks(body: &Value) -> Vec<u64> {
    body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["displayOrder"].as_u64().unwrap())
        .collect()
}

/// Store whose writes always fail
pub struct ReadOnlyStore {
    pub inner: RedbEventStore,
}

impl EventStore for ReadOnlyStore {
    fn load_all(&self) -> StorageResult<Vec<Event>> {
        self.inner.load_all()
    }

    fn get(&self, id: &str) -> StorageResult<Option<Event>> {
        self.inner.get(id)
    }

    fn create(&self, _event: Event) -> StorageResult<Event> {
        Err(read_only())
    }

    fn update(
        &self,
        _id: &str,
        _update: EventUpdate,
        _now: DateTime<Utc>,
    ) -> StorageResult<Event> {
        Err(read_only())
    }

    fn delete(&self, _id: &str) -> StorageResult<Vec<Event>> {
        Err(read_only())
    }

    fn rerank(&self, _plan: &mut RankPlan<'_>) -> StorageResult<Vec<Event>> {
        Err(read_only())
    }
}

fn read_only() -> StorageError {
    StorageError::Storage(redb::StorageError::Io(std::io::Error::other(
        "store is read-only",
    )))
}
