//! Data models
//!
//! Shared between the server and API consumers. JSON uses camelCase.

pub mod event;

// Re-exports
pub use event::*;
