//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::engine::entries::{load_roster, submit_entry, SubmitError};
use crate::engine::leaderboard::{LeaderboardEngine, PoolSummary, Standings};
use crate::store::{DocumentStore, StoreError};
use crate::types::{Entry, EntryError, EntrySubmission, Roster};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub pool_name: String,
    pub engine: Arc<LeaderboardEngine>,
    pub store: Arc<dyn DocumentStore>,
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no tournament is open for entries")]
    EntriesClosed,
    #[error("{0}")]
    InvalidEntry(#[from] EntryError),
    #[error("internal error")]
    Store(#[from] StoreError),
}

impl From<SubmitError> for ApiError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::NoOpenTournament => ApiError::EntriesClosed,
            SubmitError::Invalid(e) => ApiError::InvalidEntry(e),
            SubmitError::Store(e) => ApiError::Store(e),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::EntriesClosed => StatusCode::CONFLICT,
            ApiError::InvalidEntry(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(e) => {
                error!(error = %e, "Store error while serving request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardResponse {
    pub pool_name: String,
    pub standings: Standings,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrizesResponse {
    pub tournament_id: Option<String>,
    #[serde(flatten)]
    pub pool: PoolSummary,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/leaderboard
pub async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let standings = state.engine.load(Utc::now()).await?;
    Ok(Json(LeaderboardResponse {
        pool_name: state.pool_name.clone(),
        standings,
    }))
}

/// GET /api/prizes
pub async fn get_prizes(State(state): State<AppState>) -> Result<Json<PrizesResponse>, ApiError> {
    let tournament = state.store.current_tournament().await?;
    let entries = match &tournament {
        Some(t) => state.store.entries_for_tournament(&t.id).await?.len() as u64,
        None => 0,
    };
    Ok(Json(PrizesResponse {
        tournament_id: tournament.map(|t| t.id),
        pool: PoolSummary::new(state.engine.schedule(), entries),
    }))
}

/// GET /api/golfers
pub async fn get_golfers(State(state): State<AppState>) -> Result<Json<Roster>, ApiError> {
    Ok(Json(load_roster(state.store.as_ref()).await?))
}

/// POST /api/entries
pub async fn post_entry(
    State(state): State<AppState>,
    Json(submission): Json<EntrySubmission>,
) -> Result<(StatusCode, Json<Entry>), ApiError> {
    let entry = submit_entry(
        state.store.as_ref(),
        submission,
        Utc::now().timestamp_millis(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
