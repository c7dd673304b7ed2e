//! Shared types for the venue site backend
//!
//! Types used by the server and by API consumers: the event model,
//! request/response envelopes and the unified error system.

pub mod error;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{Event, EventCreate, EventUpdate};
