//! Leaderboard engine: turns the current tournament's entries into a
//! ranked, priced standings table, refreshing upstream scores first when
//! they have gone stale.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::prize::{Payout, PrizeSchedule};
use super::ranking::rank_entries;
use super::refresh::{RefreshOutcome, RefreshState, ScoreRefresher};
use crate::store::{DocumentStore, StoreError};
use crate::types::{Entry, Tournament, TournamentStatus};

// ---------------------------------------------------------------------------
// Standings view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Standings {
    NoActiveTournament,
    Board(Board),
}

#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub tournament: Tournament,
    pub rows: Vec<StandingRow>,
    pub pool: PoolSummary,
    pub generated_at: DateTime<Utc>,
    /// Set when this load tried to sync and failed; rows show the
    /// last-known scores.
    pub sync_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingRow {
    /// 1-based.
    pub position: u64,
    pub entry_id: String,
    pub user_name: String,
    pub total_score: Option<i32>,
    pub score_display: String,
    pub prize: u64,
    pub in_the_money: bool,
    pub paid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolSummary {
    pub entries: u64,
    pub total_pot: u64,
    pub paid_positions: u64,
    pub payouts: Vec<Payout>,
    pub daily_leader_prize: Option<u64>,
}

impl PoolSummary {
    pub fn new(schedule: &PrizeSchedule, entries: u64) -> Self {
        Self {
            entries,
            total_pot: schedule.total_pot(entries),
            paid_positions: schedule.paid_positions(entries),
            payouts: schedule.payouts(entries),
            daily_leader_prize: schedule.daily_leader_prize(entries),
        }
    }
}

/// Rank `entries` and attach prizes.
pub fn build_rows(entries: Vec<Entry>, schedule: &PrizeSchedule) -> Vec<StandingRow> {
    let total = entries.len() as u64;
    let paid_positions = schedule.paid_positions(total);

    rank_entries(entries)
        .into_iter()
        .zip(1u64..)
        .map(|(entry, position)| StandingRow {
            position,
            score_display: entry.score_display(),
            prize: schedule.prize_for(position, total),
            in_the_money: position <= paid_positions,
            paid: entry.paid,
            total_score: entry.total_score,
            user_name: entry.user_name,
            entry_id: entry.id,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct LeaderboardEngine {
    store: Arc<dyn DocumentStore>,
    refresher: ScoreRefresher,
    schedule: PrizeSchedule,
    /// Held across the staleness check and the sync so overlapping loads
    /// cannot both sync the same window.
    refresh_state: Mutex<RefreshState>,
}

impl LeaderboardEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        refresher: ScoreRefresher,
        schedule: PrizeSchedule,
    ) -> Self {
        Self {
            store,
            refresher,
            schedule,
            refresh_state: Mutex::new(RefreshState::default()),
        }
    }

    pub fn schedule(&self) -> &PrizeSchedule {
        &self.schedule
    }

    pub async fn refresh_state(&self) -> RefreshState {
        *self.refresh_state.lock().await
    }

    /// Build the standings for the current tournament.
    ///
    /// An active tournament gets a rate-limited score refresh first. A
    /// failed refresh is logged and reported on the board; it never fails
    /// the load.
    pub async fn load(&self, now: DateTime<Utc>) -> Result<Standings, StoreError> {
        let Some(tournament) = self.store.current_tournament().await? else {
            info!("No upcoming or active tournament");
            return Ok(Standings::NoActiveTournament);
        };

        let mut sync_error = None;
        if tournament.status == TournamentStatus::Active {
            let mut state = self.refresh_state.lock().await;
            match self.refresher.refresh_if_stale(&mut state, &tournament.id, now).await {
                Ok(RefreshOutcome::Synced(report)) if !report.is_complete() => {
                    warn!(
                        tournament_id = %tournament.id,
                        failed = report.failed(),
                        "Score sync was partial"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(tournament_id = %tournament.id, error = %e, "Score refresh failed, showing stale scores");
                    sync_error = Some(e.to_string());
                }
            }
        }

        // Re-read so the board carries the round/last-update just written.
        let tournament_id = tournament.id.clone();
        let tournament = self
            .store
            .tournament(&tournament_id)
            .await?
            .unwrap_or(tournament);

        let entries = self.store.entries_for_tournament(&tournament.id).await?;
        let pool = PoolSummary::new(&self.schedule, entries.len() as u64);
        let rows = build_rows(entries, &self.schedule);

        info!(
            tournament_id = %tournament.id,
            entries = rows.len(),
            pot = pool.total_pot,
            "Standings built"
        );

        Ok(Standings::Board(Board {
            tournament,
            rows,
            pool,
            generated_at: now,
            sync_error,
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sync::tests::{active_tournament, line, payload};
    use crate::engine::sync::ScoreSyncer;
    use crate::scores::{FetchError, MockScoresProvider};
    use crate::store::MemoryStore;
    use crate::types::Golfer;
    use chrono::{Duration, TimeZone};

    fn entry(id: &str, score: Option<i32>, timestamp: i64, paid: bool) -> Entry {
        Entry {
            id: id.into(),
            user_id: format!("u-{id}"),
            user_name: format!("Player {id}"),
            email: format!("{id}@example.com"),
            top_golfers: vec!["g1".into(), "g2".into(), "g3".into()],
            outside_golfers: vec!["g21".into(), "g22".into(), "g23".into()],
            birdie_tiebreaker: 15,
            timestamp,
            paid,
            total_score: score,
            tournament_id: "t1".into(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 18, 9, 30, 0).unwrap()
    }

    fn engine(store: Arc<MemoryStore>, provider: MockScoresProvider) -> LeaderboardEngine {
        let syncer = ScoreSyncer::new(store.clone(), Arc::new(provider));
        LeaderboardEngine::new(
            store,
            ScoreRefresher::new(syncer, Duration::minutes(5)),
            PrizeSchedule::default(),
        )
    }

    #[test]
    fn test_build_rows_ranks_and_prices() {
        let rows = build_rows(
            vec![
                entry("a", Some(5), 1, true),
                entry("b", Some(-2), 2, false),
                entry("c", Some(-2), 3, true),
                entry("d", Some(10), 4, false),
            ],
            &PrizeSchedule::default(),
        );
        let ids: Vec<_> = rows.iter().map(|r| r.entry_id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a", "d"]);
        assert_eq!(rows[0].position, 1);
        // 4 entries: pot 100, two paid places.
        assert_eq!(rows[0].prize, 40);
        assert_eq!(rows[1].prize, 20);
        assert_eq!(rows[2].prize, 0);
        assert!(rows[1].in_the_money);
        assert!(!rows[2].in_the_money);
        assert_eq!(rows[3].score_display, "+10");
        assert!(!rows[0].paid);
    }

    #[test]
    fn test_pool_summary() {
        let pool = PoolSummary::new(&PrizeSchedule::default(), 120);
        assert_eq!(pool.total_pot, 3000);
        assert_eq!(pool.paid_positions, 6);
        assert_eq!(pool.payouts.len(), 6);
        assert_eq!(pool.daily_leader_prize, Some(100));
    }

    #[tokio::test]
    async fn test_no_current_tournament_is_empty_state() {
        let mut provider = MockScoresProvider::new();
        provider.expect_fetch_leaderboard().never();
        let engine = engine(Arc::new(MemoryStore::new()), provider);

        let standings = engine.load(now()).await.unwrap();
        assert!(matches!(standings, Standings::NoActiveTournament));
    }

    #[tokio::test]
    async fn test_upcoming_tournament_does_not_sync() {
        let mut tournament = active_tournament();
        tournament.status = TournamentStatus::Upcoming;
        let store = Arc::new(MemoryStore::with_documents(
            vec![tournament],
            vec![],
            vec![entry("a", None, 1, false)],
        ));
        let mut provider = MockScoresProvider::new();
        provider.expect_fetch_leaderboard().never();
        let engine = engine(store, provider);

        let Standings::Board(board) = engine.load(now()).await.unwrap() else {
            panic!("expected a board");
        };
        assert_eq!(board.rows.len(), 1);
        assert_eq!(board.rows[0].score_display, "E");
        assert_eq!(engine.refresh_state().await, RefreshState::default());
    }

    #[tokio::test]
    async fn test_recorded_payment_shows_on_board() {
        let mut tournament = active_tournament();
        tournament.status = TournamentStatus::Upcoming;
        let store = Arc::new(MemoryStore::with_documents(
            vec![tournament],
            vec![],
            vec![entry("a", None, 1, false), entry("b", None, 2, false)],
        ));
        let mut provider = MockScoresProvider::new();
        provider.expect_fetch_leaderboard().never();
        let engine = engine(store.clone(), provider);

        store.set_entry_paid("b", true).await.unwrap();

        let Standings::Board(board) = engine.load(now()).await.unwrap() else {
            panic!("expected a board");
        };
        let paid: Vec<_> = board.rows.iter().map(|r| (r.entry_id.as_str(), r.paid)).collect();
        assert_eq!(paid, [("a", false), ("b", true)]);
    }

    #[tokio::test]
    async fn test_active_tournament_syncs_once_per_window() {
        let store = Arc::new(MemoryStore::with_documents(
            vec![active_tournament()],
            vec![Golfer::new("g1", "Collin Morikawa", 4)],
            vec![entry("a", Some(-3), 1, true), entry("b", Some(-6), 2, false)],
        ));
        let mut provider = MockScoresProvider::new();
        provider
            .expect_fetch_leaderboard()
            .times(1)
            .returning(|| Ok(payload(vec![line("Collin Morikawa", -6)], 3)));
        let engine = engine(store, provider);

        let Standings::Board(board) = engine.load(now()).await.unwrap() else {
            panic!("expected a board");
        };
        assert_eq!(board.tournament.current_round, Some(3));
        assert_eq!(board.tournament.last_update, Some(now().timestamp_millis()));
        assert_eq!(board.rows[0].entry_id, "b");
        assert!(board.sync_error.is_none());

        // inside the window: served without a second fetch
        engine.load(now() + Duration::minutes(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_refresh_serves_stale_board() {
        let store = Arc::new(MemoryStore::with_documents(
            vec![active_tournament()],
            vec![],
            vec![entry("a", Some(1), 1, false)],
        ));
        let mut provider = MockScoresProvider::new();
        provider
            .expect_fetch_leaderboard()
            .returning(|| Err(FetchError::Network("timed out".into())));
        let engine = engine(store, provider);

        let Standings::Board(board) = engine.load(now()).await.unwrap() else {
            panic!("expected a board");
        };
        assert!(board.sync_error.unwrap().contains("timed out"));
        assert_eq!(board.tournament.current_round, Some(1));
        assert_eq!(board.rows.len(), 1);
        assert_eq!(engine.refresh_state().await.last_update_at, 0);
    }
}
