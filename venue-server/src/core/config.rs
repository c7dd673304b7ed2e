use std::path::PathBuf;

use crate::services::ReorderPolicy;

use super::error::{Result, ServerError};

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | HTTP_HOST | 0.0.0.0 | Bind address |
/// | HTTP_PORT | 3000 | HTTP port |
/// | WORK_DIR | ./data | Directory holding `events.redb` |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | SESSION_SECRET | dev value | HMAC key for admin session tokens (required outside development) |
/// | SESSION_TTL_DAYS | 7 | Admin cookie lifetime |
/// | SESSION_ISSUER | venue-server | `iss` claim of session tokens |
/// | REORDER_POLICY | lenient | lenient \| strict |
/// | CORS_ALLOWED_ORIGIN | (unset) | Single allowed origin; permissive when unset |
/// | LOG_LEVEL | info | Fallback when RUST_LOG is unset |
/// | LOG_DIR | (unset) | Daily rolling log files when set |
/// | LOG_JSON | false | JSON log lines |
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    pub work_dir: PathBuf,
    /// development | staging | production
    pub environment: String,
    pub session_secret: String,
    pub session_ttl_days: i64,
    pub session_issuer: String,
    pub reorder_policy: ReorderPolicy,
    pub cors_allowed_origin: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(ServerError::Config(format!(
                        "{name} must be set in {environment} environment"
                    )));
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(ServerError::Config(format!(
                "{name} must not be empty in {environment} environment"
            )));
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let reorder_policy = match std::env::var("REORDER_POLICY") {
            Ok(raw) => raw.parse().map_err(ServerError::Config)?,
            Err(_) => ReorderPolicy::default(),
        };

        Ok(Self {
            http_host: std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "./data".into())
                .into(),
            session_secret: Self::require_secret("SESSION_SECRET", &environment)?,
            session_ttl_days: std::env::var("SESSION_TTL_DAYS")
                .ok()
                .and_then(|d| d.parse().ok())
                .filter(|d: &i64| *d > 0)
                .unwrap_or(7),
            session_issuer: std::env::var("SESSION_ISSUER")
                .unwrap_or_else(|_| "venue-server".into()),
            reorder_policy,
            cors_allowed_origin: std::env::var("CORS_ALLOWED_ORIGIN")
                .ok()
                .filter(|s| !s.is_empty()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            environment,
        })
    }

    /// Configuration for tests: development environment, given work dir, fixed secret
    pub fn for_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            http_host: "127.0.0.1".into(),
            http_port: 0,
            work_dir: work_dir.into(),
            environment: "development".into(),
            session_secret: "test-session-secret-0123456789abcdef".into(),
            session_ttl_days: 7,
            session_issuer: "venue-server".into(),
            reorder_policy: ReorderPolicy::default(),
            cors_allowed_origin: None,
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
        }
    }

    /// Path of the event database file
    pub fn database_path(&self) -> PathBuf {
        self.work_dir.join("events.redb")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_secret_development_fallback() {
        let val = Config::require_secret("VENUE_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(val, "dev-VENUE_TEST_UNSET_SECRET-not-for-production");
    }

    #[test]
    fn test_require_secret_production_missing() {
        let err = Config::require_secret("VENUE_TEST_UNSET_SECRET", "production").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn test_for_work_dir() {
        let config = Config::for_work_dir("/tmp/venue");
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.database_path(), PathBuf::from("/tmp/venue/events.redb"));
        assert_eq!(config.reorder_policy, ReorderPolicy::Lenient);
    }
}
