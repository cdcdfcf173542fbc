//! Handles settings for the application. Configuration is written in
//! `settings.toml`.
//!
//! See `settings.example.toml` for the available sections.
use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
    /// `DEV` relaxes the single-instance guard (a stale run file is
    /// removed instead of refusing to start).
    pub environment: String,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    /// SQLite file path; omit for an in-memory database.
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Reddit {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: Option<String>,
    pub poll_interval_secs: Option<u64>,
}

/// Ledger thresholds as exact decimal strings (e.g. `"0.1"`); parsed and
/// validated into a `LedgerConfig` at startup.
#[derive(Debug, Deserialize)]
pub struct LedgerSettings {
    pub initial_grant: String,
    pub min_tip: String,
    pub max_tip: String,
}

#[derive(Debug, Deserialize)]
pub struct Dispatch {
    /// `"before"` or `"after"`: when inbox items are marked processed
    /// relative to handling them.
    pub mark_processed: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Alerts {
    pub dev_user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopOff {
    pub enabled: bool,
    /// Weekday name (e.g. `"monday"`); defaults to monday.
    pub weekday: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub reddit: Reddit,
    pub ledger: LedgerSettings,
    pub dispatch: Option<Dispatch>,
    pub alerts: Option<Alerts>,
    pub topoff: Option<TopOff>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
