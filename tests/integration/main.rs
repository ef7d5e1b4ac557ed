//! End-to-end leaderboard flow against a SQLite store and a scripted
//! scores feed.

mod mock_scores;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

use golfpool::engine::entries::submit_entry;
use golfpool::engine::{LeaderboardEngine, PrizeSchedule, ScoreRefresher, ScoreSyncer, Standings};
use golfpool::store::{DocumentStore, SqliteStore};
use golfpool::types::{EntrySubmission, Golfer, Tournament, TournamentStatus};

use mock_scores::{player, MockScores};

fn tournament(status: TournamentStatus) -> Tournament {
    Tournament {
        id: "masters-2026".into(),
        name: "The Masters".into(),
        start_date: NaiveDate::from_ymd_opt(2026, 4, 9).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 4, 12).unwrap(),
        status,
        year: 2026,
        current_round: None,
        leader_birdies: None,
        last_update: None,
    }
}

fn field() -> Vec<Golfer> {
    let mut golfers: Vec<Golfer> = (1..=24)
        .map(|rank| Golfer::new(format!("g{rank}"), format!("Golfer {rank}"), rank))
        .collect();
    golfers[0].name = "Scottie Scheffler".into();
    golfers[1].name = "Rory McIlroy".into();
    golfers
}

fn submission(user: &str, top: [&str; 3], outside: [&str; 3]) -> EntrySubmission {
    EntrySubmission {
        user_id: user.into(),
        display_name: Some(user.to_uppercase()),
        email: Some(format!("{user}@example.com")),
        top_golfers: top.iter().map(|s| s.to_string()).collect(),
        outside_golfers: outside.iter().map(|s| s.to_string()).collect(),
        birdie_tiebreaker: 18,
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 10, 14, 0, 0).unwrap()
}

async fn seeded_store(status: TournamentStatus) -> Arc<SqliteStore> {
    let store = SqliteStore::in_memory().await.unwrap();
    store.insert_tournament(&tournament(status)).await.unwrap();
    for golfer in field() {
        store.insert_golfer(&golfer).await.unwrap();
    }
    Arc::new(store)
}

fn engine(store: Arc<SqliteStore>, scores: MockScores) -> LeaderboardEngine {
    let syncer = ScoreSyncer::new(store.clone(), Arc::new(scores));
    LeaderboardEngine::new(
        store,
        ScoreRefresher::new(syncer, Duration::minutes(5)),
        PrizeSchedule::default(),
    )
}

#[tokio::test]
async fn test_entries_rank_and_pay_out() {
    let store = seeded_store(TournamentStatus::Upcoming).await;

    let users = ["ann", "bob", "cat"];
    for (i, user) in users.iter().enumerate() {
        submit_entry(
            store.as_ref(),
            submission(user, ["g1", "g2", "g3"], ["g21", "g22", "g23"]),
            t0().timestamp_millis() + i as i64,
        )
        .await
        .unwrap();
    }

    let scores = MockScores::new(1, vec![]);
    let board = match engine(store.clone(), scores.clone()).load(t0()).await.unwrap() {
        Standings::Board(board) => board,
        other => panic!("expected a board, got {other:?}"),
    };

    // upcoming: no sync, all entries unscored and tied in submission order
    assert_eq!(scores.fetches(), 0);
    let names: Vec<_> = board.rows.iter().map(|r| r.user_name.as_str()).collect();
    assert_eq!(names, ["ANN", "BOB", "CAT"]);
    assert!(board.rows.iter().all(|r| r.score_display == "E" && !r.paid));
    assert_eq!(board.pool.total_pot, 75);
    assert_eq!(board.rows[0].prize, 30);
    assert_eq!(board.rows[1].prize, 15);
    assert_eq!(board.rows[2].prize, 0);
}

#[tokio::test]
async fn test_active_tournament_sync_is_rate_limited() {
    let store = seeded_store(TournamentStatus::Active).await;
    let scores = MockScores::new(
        2,
        vec![
            player("Scottie Scheffler", -8, 18, "1"),
            player("Rory McIlroy", -5, 16, "T2"),
            player("Walk-on Amateur", 3, 18, "T40"),
        ],
    );
    let engine = engine(store.clone(), scores.clone());

    engine.load(t0()).await.unwrap();
    assert_eq!(scores.fetches(), 1);

    let golfers = store.golfers().await.unwrap();
    assert_eq!(golfers[0].live.score, Some(-8));
    assert_eq!(golfers[1].live.position.as_deref(), Some("T2"));
    assert_eq!(golfers[2].live.score, None);

    let t = store.tournament("masters-2026").await.unwrap().unwrap();
    assert_eq!(t.current_round, Some(2));
    assert_eq!(t.last_update, Some(t0().timestamp_millis()));

    // one minute later: served from the store
    scores.set_leaderboard(2, vec![player("Scottie Scheffler", -9, 18, "1")]);
    engine.load(t0() + Duration::minutes(1)).await.unwrap();
    assert_eq!(scores.fetches(), 1);

    // six minutes later: stale again
    engine.load(t0() + Duration::minutes(6)).await.unwrap();
    assert_eq!(scores.fetches(), 2);
    let golfers = store.golfers().await.unwrap();
    assert_eq!(golfers[0].live.score, Some(-9));
}

#[tokio::test]
async fn test_upstream_outage_shows_stale_scores_then_recovers() {
    let store = seeded_store(TournamentStatus::Active).await;
    let scores = MockScores::new(3, vec![player("Rory McIlroy", -11, 9, "1")]);
    scores.fail_with(503);
    let engine = engine(store.clone(), scores.clone());

    let board = match engine.load(t0()).await.unwrap() {
        Standings::Board(board) => board,
        other => panic!("expected a board, got {other:?}"),
    };
    assert!(board.sync_error.is_some());
    assert_eq!(board.tournament.last_update, None);

    // failure did not start a new window: next load retries at once
    scores.recover();
    let board = match engine.load(t0() + Duration::seconds(30)).await.unwrap() {
        Standings::Board(board) => board,
        other => panic!("expected a board, got {other:?}"),
    };
    assert!(board.sync_error.is_none());
    assert_eq!(board.tournament.current_round, Some(3));
    assert_eq!(scores.fetches(), 2);
}

#[tokio::test]
async fn test_completed_tournament_has_no_board() {
    let store = seeded_store(TournamentStatus::Completed).await;
    let scores = MockScores::new(4, vec![]);
    let standings = engine(store, scores.clone()).load(t0()).await.unwrap();
    assert!(matches!(standings, Standings::NoActiveTournament));
    assert_eq!(scores.fetches(), 0);
}
