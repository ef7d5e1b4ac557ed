//! RapidAPI golf leaderboard feed.
//!
//! API: `https://golf-leaderboard-data.p.rapidapi.com/leaderboard/{event_id}`
//! Auth: `X-RapidAPI-Key` + `X-RapidAPI-Host` headers.
//!
//! One event is tracked per deployment; the event id comes from config.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::debug;

use super::{FetchError, LeaderboardPayload, ScoresProvider};

pub const DEFAULT_HOST: &str = "golf-leaderboard-data.p.rapidapi.com";

pub struct RapidApiClient {
    http: Client,
    api_key: SecretString,
    host: String,
    event_id: u32,
}

impl RapidApiClient {
    pub fn new(
        api_key: SecretString,
        host: Option<String>,
        event_id: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("golfpool/0.1.0")
            .build()
            .context("Failed to build HTTP client for golf scores")?;

        Ok(Self {
            http,
            api_key,
            host: host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            event_id,
        })
    }

    fn leaderboard_url(&self) -> String {
        format!("https://{}/leaderboard/{}", self.host, self.event_id)
    }
}

#[async_trait]
impl ScoresProvider for RapidApiClient {
    async fn fetch_leaderboard(&self) -> Result<LeaderboardPayload, FetchError> {
        let url = self.leaderboard_url();
        debug!(url = %url, "Fetching golf leaderboard");

        let resp = self
            .http
            .get(&url)
            .header("X-RapidAPI-Key", self.api_key.expose_secret())
            .header("X-RapidAPI-Host", &self.host)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let payload: LeaderboardPayload = resp
            .json()
            .await
            .map_err(|e| FetchError::Payload(e.to_string()))?;

        debug!(
            players = payload.results.leaderboard.len(),
            round = ?payload.results.round,
            "Golf leaderboard fetched"
        );

        Ok(payload)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
