//! Rate-limited score refresh.
//!
//! Upstream scores are pulled at most once per staleness window. The
//! window's clock lives in a `RefreshState` owned by the caller; it only
//! advances after a successful sync, so a failed fetch is retried on the
//! next call.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use super::sync::{ScoreSyncer, SyncError, SyncReport};

/// Default minimum time between upstream syncs.
pub const DEFAULT_REFRESH_INTERVAL_SECS: i64 = 5 * 60;

/// When the last successful sync happened. Starts at the epoch, so the
/// first check is always stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshState {
    /// Epoch millis.
    pub last_update_at: i64,
}

impl RefreshState {
    pub fn is_stale(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        now.timestamp_millis() - self.last_update_at >= interval.num_milliseconds()
    }

    /// Record a sync. Never moves the clock backwards.
    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.last_update_at = self.last_update_at.max(now.timestamp_millis());
    }
}

#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// Still inside the window; nothing fetched.
    Fresh { next_due_in: Duration },
    Synced(SyncReport),
}

pub struct ScoreRefresher {
    syncer: ScoreSyncer,
    interval: Duration,
}

impl ScoreRefresher {
    pub fn new(syncer: ScoreSyncer, interval: Duration) -> Self {
        Self { syncer, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sync `tournament_id` if the window since the last sync has elapsed.
    pub async fn refresh_if_stale(
        &self,
        state: &mut RefreshState,
        tournament_id: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshOutcome, SyncError> {
        if !state.is_stale(now, self.interval) {
            let elapsed = now.timestamp_millis() - state.last_update_at;
            let next_due_in = Duration::milliseconds(self.interval.num_milliseconds() - elapsed);
            debug!(tournament_id, next_due_secs = next_due_in.num_seconds(), "Scores are fresh");
            return Ok(RefreshOutcome::Fresh { next_due_in });
        }

        info!(tournament_id, "Scores are stale, syncing");
        let report = self.syncer.sync_scores(tournament_id, now).await?;
        state.mark(now);
        Ok(RefreshOutcome::Synced(report))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
