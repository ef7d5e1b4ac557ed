//! Periodic standings refresh.
//!
//! While the leaderboard is being served, a background task reloads it on
//! a fixed period so scores keep flowing even without page views. The
//! task is owned by a `RefreshTask` handle: `stop()` ends it cleanly,
//! dropping the handle aborts it.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::leaderboard::{LeaderboardEngine, Standings};

pub struct RefreshTask {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTask {
    /// Start reloading `engine` every `period`, first tick immediately.
    pub fn spawn(engine: Arc<LeaderboardEngine>, period: Duration) -> Self {
        let (tx, mut rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            info!(period_secs = period.as_secs(), "Leaderboard refresh task started");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match engine.load(Utc::now()).await {
                            Ok(Standings::Board(board)) => debug!(
                                tournament_id = %board.tournament.id,
                                entries = board.rows.len(),
                                "Periodic refresh complete"
                            ),
                            Ok(Standings::NoActiveTournament) => {
                                debug!("Periodic refresh: no current tournament");
                            }
                            Err(e) => error!(error = %e, "Periodic refresh failed"),
                        }
                    }
                    _ = &mut rx => {
                        info!("Leaderboard refresh task stopping");
                        break;
                    }
                }
            }
        });

        Self {
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    /// Signal the task and wait for it to finish its current tick.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(error = %e, "Refresh task ended abnormally");
            }
        }
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::prize::PrizeSchedule;
    use crate::engine::refresh::ScoreRefresher;
    use crate::engine::sync::tests::{active_tournament, payload};
    use crate::engine::sync::ScoreSyncer;
    use crate::scores::MockScoresProvider;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_engine(fetches: Arc<AtomicUsize>) -> Arc<LeaderboardEngine> {
        let store = Arc::new(MemoryStore::with_documents(vec![active_tournament()], vec![], vec![]));
        let mut provider = MockScoresProvider::new();
        provider.expect_fetch_leaderboard().returning(move || {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok(payload(vec![], 2))
        });
        let syncer = ScoreSyncer::new(store.clone(), Arc::new(provider));
        // zero window: every tick syncs
        Arc::new(LeaderboardEngine::new(
            store,
            ScoreRefresher::new(syncer, chrono::Duration::zero()),
            PrizeSchedule::default(),
        ))
    }

    /// Advance paused time one period at a time, letting the task run
    /// after each step.
    async fn advance_periods(period: Duration, periods: u32) {
        for _ in 0..periods {
            tokio::time::advance(period).await;
            for _ in 0..8 {
                tokio::task::yield_now().await;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_until_stopped() {
        let period = Duration::from_secs(60);
        let fetches = Arc::new(AtomicUsize::new(0));
        let task = RefreshTask::spawn(counting_engine(fetches.clone()), period);

        advance_periods(period, 5).await;
        task.stop().await;

        let after_stop = fetches.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "expected several ticks, got {after_stop}");

        advance_periods(period, 3).await;
        assert_eq!(fetches.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_task() {
        let period = Duration::from_secs(60);
        let fetches = Arc::new(AtomicUsize::new(0));
        let task = RefreshTask::spawn(counting_engine(fetches.clone()), period);

        advance_periods(period, 1).await;
        drop(task);

        let after_drop = fetches.load(Ordering::SeqCst);
        assert!(after_drop >= 1);
        advance_periods(period, 3).await;
        assert_eq!(fetches.load(Ordering::SeqCst), after_drop);
    }
}
