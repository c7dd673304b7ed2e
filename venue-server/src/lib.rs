//! Venue Server - events diary backend for the venue website
//!
//! # Module layout
//!
//! ```text
//! venue-server/src/
//! ├── core/          # config, state, server, errors
//! ├── auth/          # admin session cookies and middleware
//! ├── services/      # event ordering
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # redb event store
//! └── utils/         # logging, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::AdminSessionGate;
pub use core::{Config, Server, ServerError, ServerState};
pub use db::{EventStore, RedbEventStore};
pub use services::{EventOrderingService, ReorderPolicy};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr) => {
        tracing::info!(target: "security", level = $level, event = $event);
    };
    ($level:expr, $event:expr, $($fields:tt)*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($fields)*
        );
    };
}

/// Load `.env` and install the logger from the resulting configuration
pub fn setup_environment() -> crate::core::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );
    Ok(config)
}
