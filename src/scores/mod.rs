//! Upstream live-score providers.
//!
//! Defines the `ScoresProvider` trait and the leaderboard payload shape
//! shared by all providers. The RapidAPI golf leaderboard feed is the
//! production implementation.

pub mod rapidapi;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::types::LiveScore;

/// Why a leaderboard fetch failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("scores request failed: {0}")]
    Network(String),
    #[error("scores provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed scores payload: {0}")]
    Payload(String),
}

/// Abstraction over a live golf scoring feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoresProvider: Send + Sync {
    /// Fetch the current leaderboard for the configured event.
    async fn fetch_leaderboard(&self) -> Result<LeaderboardPayload, FetchError>;
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Top-level leaderboard response: `{ "results": { ... } }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardPayload {
    pub results: LeaderboardResults,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardResults {
    #[serde(default)]
    pub leaderboard: Vec<PlayerLine>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub round: Option<i32>,
}

/// One player's row in the upstream leaderboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerLine {
    pub player_name: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub total_to_par: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub thru: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub today_to_par: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub total_strokes: Option<i32>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub position: Option<String>,
}

impl PlayerLine {
    /// The live fields this line overwrites on the matching golfer.
    pub fn live_score(&self) -> LiveScore {
        LiveScore {
            score: self.total_to_par,
            thru: self.thru,
            today: self.today_to_par,
            total: self.total_strokes,
            position: self.position.clone(),
        }
    }
}

/// Accept `-4`, `"-4"`, `"+2"`, `"E"` (even) and treat anything else
/// ("F", "CUT", null) as absent.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("e") {
                Some(0)
            } else {
                s.trim_start_matches('+').parse().ok()
            }
        }
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
