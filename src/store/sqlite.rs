//! SQLite-backed document store.
//!
//! Each collection is one table. Pick lists are stored as JSON arrays,
//! dates as ISO `YYYY-MM-DD` text. "First match" queries order by rowid,
//! i.e. insertion order.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::info;

use super::{DocumentStore, StoreError};
use crate::types::{Entry, Golfer, LiveScore, Tournament, TournamentStatus};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tournaments (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        status TEXT NOT NULL,
        year INTEGER NOT NULL,
        current_round INTEGER,
        leader_birdies INTEGER,
        last_update INTEGER
    )",
    "CREATE TABLE IF NOT EXISTS golfers (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        rank INTEGER NOT NULL,
        score INTEGER,
        thru INTEGER,
        today INTEGER,
        total INTEGER,
        position TEXT
    )",
    "CREATE INDEX IF NOT EXISTS golfers_name ON golfers (name)",
    "CREATE TABLE IF NOT EXISTS entries (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        user_name TEXT NOT NULL,
        email TEXT NOT NULL,
        top_golfers TEXT NOT NULL,
        outside_golfers TEXT NOT NULL,
        birdie_tiebreaker INTEGER NOT NULL,
        timestamp INTEGER NOT NULL,
        paid INTEGER NOT NULL DEFAULT 0,
        total_score INTEGER,
        tournament_id TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS entries_tournament ON entries (tournament_id)",
];

const TOURNAMENT_COLUMNS: &str =
    "id, name, start_date, end_date, status, year, current_round, leader_birdies, last_update";
const GOLFER_COLUMNS: &str = "id, name, rank, score, thru, today, total, position";
const ENTRY_COLUMNS: &str = "id, user_id, user_name, email, top_golfers, outside_golfers, \
     birdie_tiebreaker, timestamp, paid, total_score, tournament_id";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and apply the schema.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        info!(url, "SQLite store ready");
        Self::with_schema(pool).await
    }

    /// A private in-memory database. Every SQLite memory connection is its
    /// own database, so the pool holds exactly one that never expires.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_schema(pool).await
    }

    async fn with_schema(pool: SqlitePool) -> Result<Self, StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(Self { pool })
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn corrupt(collection: &'static str, reason: impl ToString) -> StoreError {
    StoreError::Corrupt { collection, reason: reason.to_string() }
}

fn parse_date(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| corrupt("tournaments", e))
}

fn opt_u32(value: Option<i64>, collection: &'static str) -> Result<Option<u32>, StoreError> {
    value
        .map(|v| u32::try_from(v).map_err(|e| corrupt(collection, e)))
        .transpose()
}

fn tournament_from_row(row: &SqliteRow) -> Result<Tournament, StoreError> {
    let status: String = row.try_get("status")?;
    let start_date: String = row.try_get("start_date")?;
    let end_date: String = row.try_get("end_date")?;
    Ok(Tournament {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        start_date: parse_date(&start_date)?,
        end_date: parse_date(&end_date)?,
        status: status
            .parse::<TournamentStatus>()
            .map_err(|e| corrupt("tournaments", e))?,
        year: row.try_get("year")?,
        current_round: opt_u32(row.try_get("current_round")?, "tournaments")?,
        leader_birdies: opt_u32(row.try_get("leader_birdies")?, "tournaments")?,
        last_update: row.try_get("last_update")?,
    })
}

fn golfer_from_row(row: &SqliteRow) -> Result<Golfer, StoreError> {
    let rank: i64 = row.try_get("rank")?;
    Ok(Golfer {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        rank: u32::try_from(rank).map_err(|e| corrupt("golfers", e))?,
        live: LiveScore {
            score: row.try_get("score")?,
            thru: row.try_get("thru")?,
            today: row.try_get("today")?,
            total: row.try_get("total")?,
            position: row.try_get("position")?,
        },
    })
}

fn entry_from_row(row: &SqliteRow) -> Result<Entry, StoreError> {
    let top: String = row.try_get("top_golfers")?;
    let outside: String = row.try_get("outside_golfers")?;
    Ok(Entry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        user_name: row.try_get("user_name")?,
        email: row.try_get("email")?,
        top_golfers: serde_json::from_str(&top).map_err(|e| corrupt("entries", e))?,
        outside_golfers: serde_json::from_str(&outside).map_err(|e| corrupt("entries", e))?,
        birdie_tiebreaker: row.try_get("birdie_tiebreaker")?,
        timestamp: row.try_get("timestamp")?,
        paid: row.try_get("paid")?,
        total_score: row.try_get("total_score")?,
        tournament_id: row.try_get("tournament_id")?,
    })
}

fn ensure_updated(rows: u64, collection: &'static str, id: &str) -> Result<(), StoreError> {
    if rows == 0 {
        return Err(StoreError::NotFound { collection, id: id.to_string() });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// DocumentStore
// ---------------------------------------------------------------------------

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn current_tournament(&self) -> Result<Option<Tournament>, StoreError> {
        let sql = format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments \
             WHERE status IN ('upcoming', 'active') ORDER BY rowid LIMIT 1"
        );
        let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
        row.as_ref().map(tournament_from_row).transpose()
    }

    async fn tournament(&self, id: &str) -> Result<Option<Tournament>, StoreError> {
        let sql = format!("SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(tournament_from_row).transpose()
    }

    async fn golfer_by_name(&self, name: &str) -> Result<Option<Golfer>, StoreError> {
        let sql = format!("SELECT {GOLFER_COLUMNS} FROM golfers WHERE name = ? ORDER BY rowid LIMIT 1");
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(golfer_from_row).transpose()
    }

    async fn golfers(&self) -> Result<Vec<Golfer>, StoreError> {
        let sql = format!("SELECT {GOLFER_COLUMNS} FROM golfers ORDER BY rowid");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(golfer_from_row).collect()
    }

    async fn update_golfer_live(&self, id: &str, live: &LiveScore) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE golfers SET score = ?, thru = ?, today = ?, total = ?, position = ? WHERE id = ?",
        )
        .bind(live.score)
        .bind(live.thru)
        .bind(live.today)
        .bind(live.total)
        .bind(live.position.as_deref())
        .bind(id)
        .execute(&self.pool)
        .await?;
        ensure_updated(result.rows_affected(), "golfers", id)
    }

    async fn update_tournament_progress(
        &self,
        id: &str,
        current_round: Option<u32>,
        last_update: i64,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE tournaments SET current_round = COALESCE(?, current_round), last_update = ? \
             WHERE id = ?",
        )
        .bind(current_round.map(i64::from))
        .bind(last_update)
        .bind(id)
        .execute(&self.pool)
        .await?;
        ensure_updated(result.rows_affected(), "tournaments", id)
    }

    async fn entries_for_tournament(&self, tournament_id: &str) -> Result<Vec<Entry>, StoreError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE tournament_id = ? ORDER BY timestamp, rowid"
        );
        let rows = sqlx::query(&sql)
            .bind(tournament_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(entry_from_row).collect()
    }

    async fn insert_entry(&self, entry: &Entry) -> Result<(), StoreError> {
        let top = serde_json::to_string(&entry.top_golfers).map_err(|e| corrupt("entries", e))?;
        let outside =
            serde_json::to_string(&entry.outside_golfers).map_err(|e| corrupt("entries", e))?;
        let sql = format!(
            "INSERT INTO entries ({ENTRY_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        sqlx::query(&sql)
            .bind(&entry.id)
            .bind(&entry.user_id)
            .bind(&entry.user_name)
            .bind(&entry.email)
            .bind(top)
            .bind(outside)
            .bind(entry.birdie_tiebreaker)
            .bind(entry.timestamp)
            .bind(entry.paid)
            .bind(entry.total_score)
            .bind(&entry.tournament_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_entry_paid(&self, entry_id: &str, paid: bool) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE entries SET paid = ? WHERE id = ?")
            .bind(paid)
            .bind(entry_id)
            .execute(&self.pool)
            .await?;
        ensure_updated(result.rows_affected(), "entries", entry_id)
    }

    async fn insert_golfer(&self, golfer: &Golfer) -> Result<(), StoreError> {
        let sql = format!("INSERT INTO golfers ({GOLFER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)");
        sqlx::query(&sql)
            .bind(&golfer.id)
            .bind(&golfer.name)
            .bind(i64::from(golfer.rank))
            .bind(golfer.live.score)
            .bind(golfer.live.thru)
            .bind(golfer.live.today)
            .bind(golfer.live.total)
            .bind(golfer.live.position.as_deref())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_tournament(&self, tournament: &Tournament) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO tournaments ({TOURNAMENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        sqlx::query(&sql)
            .bind(&tournament.id)
            .bind(&tournament.name)
            .bind(tournament.start_date.format("%Y-%m-%d").to_string())
            .bind(tournament.end_date.format("%Y-%m-%d").to_string())
            .bind(tournament.status.as_str())
            .bind(tournament.year)
            .bind(tournament.current_round.map(i64::from))
            .bind(tournament.leader_birdies.map(i64::from))
            .bind(tournament.last_update)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
