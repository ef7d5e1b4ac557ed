//! Core engine: score sync, ranking, prizes and standings.

pub mod entries;
pub mod leaderboard;
pub mod prize;
pub mod ranking;
pub mod refresh;
pub mod scheduler;
pub mod sync;

pub use leaderboard::{Board, LeaderboardEngine, Standings};
pub use prize::{compute_prize, PrizeSchedule};
pub use ranking::rank_entries;
pub use refresh::{RefreshOutcome, RefreshState, ScoreRefresher};
pub use scheduler::RefreshTask;
pub use sync::{ScoreSyncer, SyncError, SyncReport};
