//! Mock scores provider for integration testing.
//!
//! Serves a scripted leaderboard from memory, counts fetches, and can be
//! switched into a failing mode. No network involved.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use golfpool::scores::{FetchError, LeaderboardPayload, LeaderboardResults, PlayerLine, ScoresProvider};

#[derive(Clone, Default)]
pub struct MockScores {
    payload: Arc<Mutex<LeaderboardPayload>>,
    fetches: Arc<AtomicUsize>,
    /// If set, every fetch fails with this HTTP status.
    force_status: Arc<Mutex<Option<u16>>>,
}

impl MockScores {
    pub fn new(round: i32, lines: Vec<PlayerLine>) -> Self {
        let mock = Self::default();
        mock.set_leaderboard(round, lines);
        mock
    }

    pub fn set_leaderboard(&self, round: i32, lines: Vec<PlayerLine>) {
        *self.payload.lock().unwrap() = LeaderboardPayload {
            results: LeaderboardResults { leaderboard: lines, round: Some(round) },
        };
    }

    pub fn fail_with(&self, status: u16) {
        *self.force_status.lock().unwrap() = Some(status);
    }

    pub fn recover(&self) {
        *self.force_status.lock().unwrap() = None;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

pub fn player(name: &str, to_par: i32, thru: i32, position: &str) -> PlayerLine {
    PlayerLine {
        player_name: name.to_string(),
        total_to_par: Some(to_par),
        thru: Some(thru),
        today_to_par: Some(to_par.min(0)),
        total_strokes: Some(140 + to_par),
        position: Some(position.to_string()),
    }
}

#[async_trait]
impl ScoresProvider for MockScores {
    async fn fetch_leaderboard(&self) -> Result<LeaderboardPayload, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.force_status.lock().unwrap() {
            return Err(FetchError::Status { status, body: "mock failure".into() });
        }
        Ok(self.payload.lock().unwrap().clone())
    }
}
