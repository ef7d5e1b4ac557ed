//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the scores API key) are referenced by env-var name in the
//! config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::engine::PrizeSchedule;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub pool: PoolConfig,
    pub refresh: RefreshConfig,
    pub scores: ScoresConfig,
    pub store: StoreConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PoolConfig {
    pub name: String,
    #[serde(default = "default_entry_fee")]
    pub entry_fee: u64,
    #[serde(default = "default_entries_per_extra_place")]
    pub entries_per_extra_place: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    /// Minimum seconds between upstream syncs.
    pub interval_secs: u64,
    /// Seconds between background standings reloads.
    pub task_period_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScoresConfig {
    pub event_id: u32,
    #[serde(default)]
    pub host: Option<String>,
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

fn default_entry_fee() -> u64 {
    25
}

fn default_entries_per_extra_place() -> u64 {
    25
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_max_connections() -> u32 {
    5
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Minimum time between upstream syncs.
    pub fn refresh_interval(&self) -> Result<chrono::Duration> {
        i64::try_from(self.refresh.interval_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .with_context(|| {
                format!("refresh.interval_secs out of range: {}", self.refresh.interval_secs)
            })
    }

    pub fn prize_schedule(&self) -> PrizeSchedule {
        PrizeSchedule {
            entry_fee: self.pool.entry_fee,
            entries_per_extra_place: self.pool.entries_per_extra_place,
            ..PrizeSchedule::default()
        }
    }
}
