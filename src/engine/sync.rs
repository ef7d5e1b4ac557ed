//! Score sync: pulls the upstream leaderboard into the golfer documents.
//!
//! Each upstream player is matched to a golfer by exact name. Lookups and
//! writes for all players run concurrently; every player produces its own
//! outcome, so one failed write never stops the others. The tournament's
//! round and last-update stamp are written after the fan-out regardless
//! of individual failures.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::scores::{FetchError, PlayerLine, ScoresProvider};
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("upstream fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("store write failed: {0}")]
    Store(#[from] StoreError),
}

/// What happened to one upstream player during a sync.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerOutcome {
    Updated { player: String, golfer_id: String },
    /// No golfer with this exact name in the store.
    Unmatched { player: String },
    Failed { player: String, reason: String },
}

/// Per-player results of one sync.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub tournament_id: String,
    pub round: Option<u32>,
    pub outcomes: Vec<PlayerOutcome>,
    /// Epoch millis written to the tournament; `None` when nothing ran.
    pub synced_at: Option<i64>,
}

impl SyncReport {
    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, PlayerOutcome::Updated { .. }))
    }

    pub fn unmatched(&self) -> usize {
        self.count(|o| matches!(o, PlayerOutcome::Unmatched { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, PlayerOutcome::Failed { .. }))
    }

    /// True when no matched golfer failed to update.
    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&PlayerOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

pub struct ScoreSyncer {
    store: Arc<dyn DocumentStore>,
    provider: Arc<dyn ScoresProvider>,
}

impl ScoreSyncer {
    pub fn new(store: Arc<dyn DocumentStore>, provider: Arc<dyn ScoresProvider>) -> Self {
        Self { store, provider }
    }

    /// Pull live scores for `tournament_id` and write them to the store.
    pub async fn sync_scores(
        &self,
        tournament_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport {
            tournament_id: tournament_id.to_string(),
            ..Default::default()
        };

        if self.store.tournament(tournament_id).await?.is_none() {
            warn!(tournament_id, "Tournament not found, skipping score sync");
            return Ok(report);
        }

        let payload = self.provider.fetch_leaderboard().await?;
        let lines = &payload.results.leaderboard;
        debug!(tournament_id, players = lines.len(), "Applying upstream leaderboard");

        report.outcomes = join_all(lines.iter().map(|line| self.apply_line(line))).await;
        report.round = payload.results.round.and_then(|r| u32::try_from(r).ok());

        let synced_at = now.timestamp_millis();
        self.store
            .update_tournament_progress(tournament_id, report.round, synced_at)
            .await?;
        report.synced_at = Some(synced_at);

        info!(
            tournament_id,
            round = ?report.round,
            updated = report.updated(),
            unmatched = report.unmatched(),
            failed = report.failed(),
            "Score sync complete"
        );

        Ok(report)
    }

    async fn apply_line(&self, line: &PlayerLine) -> PlayerOutcome {
        let player = line.player_name.clone();

        let golfer = match self.store.golfer_by_name(&line.player_name).await {
            Ok(Some(golfer)) => golfer,
            Ok(None) => {
                debug!(player = %player, "No golfer matches upstream player");
                return PlayerOutcome::Unmatched { player };
            }
            Err(e) => {
                warn!(player = %player, error = %e, "Golfer lookup failed");
                return PlayerOutcome::Failed { player, reason: e.to_string() };
            }
        };

        match self.store.update_golfer_live(&golfer.id, &line.live_score()).await {
            Ok(()) => PlayerOutcome::Updated { player, golfer_id: golfer.id },
            Err(e) => {
                warn!(player = %player, golfer_id = %golfer.id, error = %e, "Golfer update failed");
                PlayerOutcome::Failed { player, reason: e.to_string() }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
