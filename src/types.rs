//! Shared types for the golf pool.
//!
//! These types mirror the documents held in the `tournaments`, `golfers`
//! and `entries` collections. Field names serialize in camelCase so a
//! stored document round-trips without a mapping layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Golfers ranked at or above this number belong to the "top" bracket.
pub const TOP_BRACKET_MAX_RANK: u32 = 20;

/// Picks required from each bracket.
pub const PICKS_PER_BRACKET: usize = 3;

// ---------------------------------------------------------------------------
// Golfer
// ---------------------------------------------------------------------------

/// A golfer in the tournament field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Golfer {
    pub id: String,
    pub name: String,
    /// World/field rank, 1 = best. Fixed for the tournament.
    pub rank: u32,
    #[serde(flatten)]
    pub live: LiveScore,
}

impl Golfer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rank: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rank,
            live: LiveScore::default(),
        }
    }

    pub fn bracket(&self) -> Bracket {
        if self.rank <= TOP_BRACKET_MAX_RANK {
            Bracket::Top
        } else {
            Bracket::Outside
        }
    }
}

/// Live fields overwritten on every score sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveScore {
    /// Score relative to par.
    #[serde(default)]
    pub score: Option<i32>,
    /// Holes completed in the current round.
    #[serde(default)]
    pub thru: Option<i32>,
    /// Today's score relative to par.
    #[serde(default)]
    pub today: Option<i32>,
    /// Total strokes.
    #[serde(default)]
    pub total: Option<i32>,
    /// Leaderboard position as reported upstream ("1", "T3", "CUT").
    #[serde(default)]
    pub position: Option<String>,
}

/// The two pick brackets an entry draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bracket {
    Top,
    Outside,
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bracket::Top => write!(f, "top"),
            Bracket::Outside => write!(f, "outside"),
        }
    }
}

/// The tournament field, split for pick lists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Roster {
    pub top: Vec<Golfer>,
    pub outside: Vec<Golfer>,
}

impl Roster {
    pub fn split(golfers: Vec<Golfer>) -> Self {
        let (top, outside) = golfers
            .into_iter()
            .partition(|g| g.bracket() == Bracket::Top);
        Self { top, outside }
    }

    fn find(&self, id: &str) -> Option<&Golfer> {
        self.top.iter().chain(self.outside.iter()).find(|g| g.id == id)
    }
}

// ---------------------------------------------------------------------------
// Tournament
// ---------------------------------------------------------------------------

/// Tournament lifecycle: upcoming → active → completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    Upcoming,
    Active,
    Completed,
}

impl TournamentStatus {
    /// Whether the leaderboard should consider this tournament current.
    pub fn is_current(&self) -> bool {
        matches!(self, TournamentStatus::Upcoming | TournamentStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "upcoming",
            TournamentStatus::Active => "active",
            TournamentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TournamentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upcoming" => Ok(TournamentStatus::Upcoming),
            "active" => Ok(TournamentStatus::Active),
            "completed" => Ok(TournamentStatus::Completed),
            other => anyhow::bail!("Unknown tournament status: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: TournamentStatus,
    pub year: i32,
    #[serde(default)]
    pub current_round: Option<u32>,
    /// Birdies made by the eventual winner; the tiebreaker truth value.
    #[serde(default)]
    pub leader_birdies: Option<u32>,
    /// Epoch millis of the last successful score sync.
    #[serde(default)]
    pub last_update: Option<i64>,
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A user's submitted picks for one tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub top_golfers: Vec<String>,
    pub outside_golfers: Vec<String>,
    /// Predicted total birdies by the eventual winner.
    pub birdie_tiebreaker: i32,
    /// Submission time, epoch millis.
    pub timestamp: i64,
    pub paid: bool,
    /// Lower is better. Absent until scores are computed.
    #[serde(default)]
    pub total_score: Option<i32>,
    pub tournament_id: String,
}

impl Entry {
    /// Score shown on the leaderboard: "E" for even or unscored.
    pub fn score_display(&self) -> String {
        match self.total_score {
            None | Some(0) => "E".to_string(),
            Some(s) if s > 0 => format!("+{s}"),
            Some(s) => s.to_string(),
        }
    }
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("expected {expected} {bracket} golfers, got {actual}")]
    WrongPickCount {
        bracket: Bracket,
        expected: usize,
        actual: usize,
    },
    #[error("golfer {0} picked more than once")]
    DuplicatePick(String),
    #[error("unknown golfer {0}")]
    UnknownGolfer(String),
    #[error("golfer {golfer} is not in the {expected} bracket")]
    WrongBracket { golfer: String, expected: Bracket },
}

/// An entry as submitted, before validation against the roster.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySubmission {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub top_golfers: Vec<String>,
    pub outside_golfers: Vec<String>,
    pub birdie_tiebreaker: i32,
}

impl EntrySubmission {
    /// Check the picks against the roster and build the stored entry.
    pub fn validate(
        self,
        roster: &Roster,
        tournament_id: &str,
        submitted_at: i64,
    ) -> Result<Entry, EntryError> {
        let mut seen = HashSet::new();
        for (picks, bracket) in [
            (&self.top_golfers, Bracket::Top),
            (&self.outside_golfers, Bracket::Outside),
        ] {
            if picks.len() != PICKS_PER_BRACKET {
                return Err(EntryError::WrongPickCount {
                    bracket,
                    expected: PICKS_PER_BRACKET,
                    actual: picks.len(),
                });
            }
            for id in picks {
                if !seen.insert(id.as_str()) {
                    return Err(EntryError::DuplicatePick(id.clone()));
                }
                let golfer = roster
                    .find(id)
                    .ok_or_else(|| EntryError::UnknownGolfer(id.clone()))?;
                if golfer.bracket() != bracket {
                    return Err(EntryError::WrongBracket {
                        golfer: golfer.name.clone(),
                        expected: bracket,
                    });
                }
            }
        }

        let email = self.email.unwrap_or_default();
        let user_name = self
            .display_name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                email
                    .split('@')
                    .next()
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Anonymous".to_string());

        Ok(Entry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: self.user_id,
            user_name,
            email,
            top_golfers: self.top_golfers,
            outside_golfers: self.outside_golfers,
            birdie_tiebreaker: self.birdie_tiebreaker,
            timestamp: submitted_at,
            paid: false,
            total_score: None,
            tournament_id: tournament_id.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
