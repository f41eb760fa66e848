//! # Application State
//!
//! Shared state for the Axum application: configuration, the in-memory
//! handbook, submitted policy questions, and the optional database pool.
//!
//! The in-memory stores are authoritative while the process runs. When a
//! pool is configured, writes go through to Postgres as well.

use std::path::PathBuf;
use std::sync::Arc;

use handbook_core::{Handbook, PolicyRequest};
use parking_lot::RwLock;
use sqlx::PgPool;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TITLE: &str = "Employee Handbook";

/// Runtime configuration, read from the environment by [`AppConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `HANDBOOK_PORT`.
    pub port: u16,
    /// `HANDBOOK_SEED`: YAML seed loaded at startup.
    pub seed_path: Option<PathBuf>,
    /// `HANDBOOK_METRICS_ENABLED`: anything other than `"false"` enables.
    pub metrics_enabled: bool,
    /// `HANDBOOK_TITLE`: heading of the introduction fragment.
    pub title: String,
    /// `HANDBOOK_LOG_FORMAT=json` switches the subscriber to JSON lines.
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            seed_path: None,
            metrics_enabled: true,
            title: DEFAULT_TITLE.to_string(),
            json_logs: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let port = match lookup("HANDBOOK_PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "HANDBOOK_PORT is not a valid port, using default");
                defaults.port
            }),
            None => defaults.port,
        };
        let title = lookup("HANDBOOK_TITLE")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(defaults.title);
        Self {
            port,
            seed_path: lookup("HANDBOOK_SEED")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            metrics_enabled: lookup("HANDBOOK_METRICS_ENABLED")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
            title,
            json_logs: lookup("HANDBOOK_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub handbook: Arc<RwLock<Handbook>>,
    pub requests: Arc<RwLock<Vec<PolicyRequest>>>,
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Empty handbook, default configuration, no database.
    pub fn new() -> Self {
        Self::with_handbook(Handbook::new())
    }

    pub fn with_handbook(handbook: Handbook) -> Self {
        Self::with_config(AppConfig::default(), handbook, None)
    }

    pub fn with_config(config: AppConfig, handbook: Handbook, db_pool: Option<PgPool>) -> Self {
        Self {
            config: Arc::new(config),
            handbook: Arc::new(RwLock::new(handbook)),
            requests: Arc::new(RwLock::new(Vec::new())),
            db_pool,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(AppConfig::from_lookup(lookup(&[])), AppConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HANDBOOK_PORT", "9000"),
            ("HANDBOOK_SEED", "/etc/handbook.yaml"),
            ("HANDBOOK_METRICS_ENABLED", "FALSE"),
            ("HANDBOOK_TITLE", "Staff Handbook"),
            ("HANDBOOK_LOG_FORMAT", "json"),
        ]));
        assert_eq!(config.port, 9000);
        assert_eq!(config.seed_path, Some(PathBuf::from("/etc/handbook.yaml")));
        assert!(!config.metrics_enabled);
        assert_eq!(config.title, "Staff Handbook");
        assert!(config.json_logs);
    }

    #[test]
    fn bad_port_falls_back() {
        let config = AppConfig::from_lookup(lookup(&[("HANDBOOK_PORT", "http")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn blank_title_falls_back() {
        let config = AppConfig::from_lookup(lookup(&[("HANDBOOK_TITLE", "  ")]));
        assert_eq!(config.title, DEFAULT_TITLE);
    }
}
