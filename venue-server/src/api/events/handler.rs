//! Event API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde_json::Value;
use shared::models::{Event, EventCreate, EventUpdate};
use shared::response::{EventResponse, EventsResponse};
use shared::{AppError, AppResult, ErrorCode};

use crate::core::ServerState;
use crate::db::StorageError;
use crate::services::{INVALID_FORMAT_MESSAGE, OrderingError};
use crate::utils::validation::{validate_event_create, validate_event_update};

fn storage_error(e: StorageError) -> AppError {
    match e {
        StorageError::EventNotFound(id) => AppError::event_not_found(&id),
        other => AppError::database(other.to_string()),
    }
}

/// GET /events - full collection in presentation order
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<EventsResponse>> {
    let events = state.store.load_all().map_err(storage_error)?;
    Ok(Json(EventsResponse::ok(events)))
}

/// GET /events/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<EventResponse>> {
    let event = state
        .store
        .get(&id)
        .map_err(storage_error)?
        .ok_or_else(|| AppError::event_not_found(&id))?;
    Ok(Json(EventResponse::ok(event)))
}

/// POST /events - new events are ranked last
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EventCreate>,
) -> AppResult<Json<EventResponse>> {
    validate_event_create(&payload)?;

    let now = shared::util::now();
    let event = Event {
        id: shared::util::new_id(),
        title: payload.title.trim().to_string(),
        date: payload.date,
        start_time: payload.start_time,
        description: payload.description,
        image_url: payload.image_url,
        ticket_url: payload.ticket_url,
        display_order: 0,
        created_at: now,
        updated_at: now,
    };

    let event = state.store.create(event).map_err(storage_error)?;
    tracing::info!(event_id = %event.id, display_order = event.display_order, "Event created");
    Ok(Json(EventResponse::ok(event)))
}

/// PUT /events/{id} - partial update; the rank is not editable here
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<EventUpdate>,
) -> AppResult<Json<EventResponse>> {
    validate_event_update(&payload)?;

    let event = state
        .store
        .update(&id, payload, shared::util::now())
        .map_err(storage_error)?;
    tracing::info!(event_id = %id, "Event updated");
    Ok(Json(EventResponse::ok(event)))
}

/// DELETE /events/{id} - returns the remaining collection, re-ranked
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<EventsResponse>> {
    let remaining = state.store.delete(&id).map_err(storage_error)?;
    tracing::info!(event_id = %id, remaining = remaining.len(), "Event deleted");
    Ok(Json(EventsResponse::ok(remaining)))
}

/// POST /events/reorder - `{ "eventIds": [...] }`
///
/// The body is read raw so that a non-JSON body and a missing or non-array
/// `eventIds` all produce the same 400 response.
pub async fn reorder(
    State(state): State<ServerState>,
    body: Bytes,
) -> AppResult<Json<EventsResponse>> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::invalid_format(INVALID_FORMAT_MESSAGE))?;

    let events = state
        .ordering
        .reorder_json(&payload)
        .map_err(ordering_error)?;

    tracing::info!(
        count = events.len(),
        policy = %state.ordering.policy(),
        "Events reordered"
    );
    Ok(Json(EventsResponse::ok(events)))
}

fn ordering_error(e: OrderingError) -> AppError {
    match e {
        OrderingError::InvalidInput(msg) if msg == INVALID_FORMAT_MESSAGE => {
            AppError::invalid_format(msg)
        }
        OrderingError::InvalidInput(msg) => AppError::with_error(ErrorCode::EventOrderInvalid, msg),
        OrderingError::Persistence(e) => {
            tracing::error!(error = %e, "Failed to persist event order");
            AppError::database("Failed to reorder events")
        }
    }
}
