//! Entry intake.

use thiserror::Error;
use tracing::info;

use crate::store::{DocumentStore, StoreError};
use crate::types::{Entry, EntryError, EntrySubmission, Roster, TournamentStatus};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no tournament is open for entries")]
    NoOpenTournament,
    #[error("invalid entry: {0}")]
    Invalid(#[from] EntryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The current tournament's field, split into pick brackets.
pub async fn load_roster(store: &dyn DocumentStore) -> Result<Roster, StoreError> {
    Ok(Roster::split(store.golfers().await?))
}

/// Validate a submission against the upcoming tournament's field and
/// store it. Entries are only accepted before the tournament starts.
pub async fn submit_entry(
    store: &dyn DocumentStore,
    submission: EntrySubmission,
    submitted_at: i64,
) -> Result<Entry, SubmitError> {
    let tournament = store
        .current_tournament()
        .await?
        .filter(|t| t.status == TournamentStatus::Upcoming)
        .ok_or(SubmitError::NoOpenTournament)?;

    let roster = load_roster(store).await?;
    let entry = submission.validate(&roster, &tournament.id, submitted_at)?;
    store.insert_entry(&entry).await?;

    info!(
        entry_id = %entry.id,
        tournament_id = %tournament.id,
        user_name = %entry.user_name,
        "Entry submitted"
    );
    Ok(entry)
}
