use std::str::FromStr;

use anyhow::{Context, Result};

use crate::readings::SummaryAggregator;

// ---------------------------------------------------------------------------
// StoreBackend
// ---------------------------------------------------------------------------

/// Where readings are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Postgres at `DATABASE_URL`.
    Postgres { database_url: String, max_connections: u32 },
    /// Process memory; readings are lost on restart.
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow::anyhow!("unknown reading store: {other:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Limits used by the dashboard page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub window_hours: i64,
    pub readings_limit: usize,
    pub alerts_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window_hours: SummaryAggregator::DEFAULT_WINDOW_HOURS,
            readings_limit: SummaryAggregator::DEFAULT_READINGS_LIMIT,
            alerts_limit: SummaryAggregator::DEFAULT_ALERTS_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub server_host: String,
    pub server_port: u16,
    pub dashboard: DashboardConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process
    /// environment.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            get(key).with_context(|| format!("missing required env var: {key}"))
        };
        let optional = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_owned());

        let store = match optional("READING_STORE", "postgres")
            .trim()
            .parse::<StoreKind>()
            .context("READING_STORE must be 'postgres' or 'memory'")?
        {
            StoreKind::Postgres => StoreBackend::Postgres {
                database_url: required("DATABASE_URL")?,
                max_connections: optional("DATABASE_MAX_CONNECTIONS", "10")
                    .parse()
                    .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            },
            StoreKind::Memory => StoreBackend::Memory,
        };

        let defaults = DashboardConfig::default();

        let window_hours: i64 =
            optional("DASHBOARD_WINDOW_HOURS", &defaults.window_hours.to_string())
                .parse()
                .context("DASHBOARD_WINDOW_HOURS must be an integer")?;
        anyhow::ensure!(
            (1..=SummaryAggregator::MAX_WINDOW_HOURS).contains(&window_hours),
            "DASHBOARD_WINDOW_HOURS must be between 1 and {}",
            SummaryAggregator::MAX_WINDOW_HOURS
        );

        Ok(Self {
            store,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            dashboard: DashboardConfig {
                window_hours,
                readings_limit: optional(
                    "DASHBOARD_READINGS_LIMIT",
                    &defaults.readings_limit.to_string(),
                )
                .parse()
                .context("DASHBOARD_READINGS_LIMIT must be a positive integer")?,
                alerts_limit: optional("DASHBOARD_ALERTS_LIMIT", &defaults.alerts_limit.to_string())
                    .parse()
                    .context("DASHBOARD_ALERTS_LIMIT must be a positive integer")?,
            },
        })
    }
}
