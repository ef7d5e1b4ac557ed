//! In-memory document store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError};
use crate::types::{Entry, Golfer, LiveScore, Tournament};

/// Collections held in insertion order, behind async locks.
#[derive(Default)]
pub struct MemoryStore {
    tournaments: RwLock<Vec<Tournament>>,
    golfers: RwLock<Vec<Golfer>>,
    entries: RwLock<Vec<Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(
        tournaments: Vec<Tournament>,
        golfers: Vec<Golfer>,
        entries: Vec<Entry>,
    ) -> Self {
        Self {
            tournaments: RwLock::new(tournaments),
            golfers: RwLock::new(golfers),
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn current_tournament(&self) -> Result<Option<Tournament>, StoreError> {
        let tournaments = self.tournaments.read().await;
        Ok(tournaments.iter().find(|t| t.status.is_current()).cloned())
    }

    async fn tournament(&self, id: &str) -> Result<Option<Tournament>, StoreError> {
        let tournaments = self.tournaments.read().await;
        Ok(tournaments.iter().find(|t| t.id == id).cloned())
    }

    async fn golfer_by_name(&self, name: &str) -> Result<Option<Golfer>, StoreError> {
        let golfers = self.golfers.read().await;
        Ok(golfers.iter().find(|g| g.name == name).cloned())
    }

    async fn golfers(&self) -> Result<Vec<Golfer>, StoreError> {
        Ok(self.golfers.read().await.clone())
    }

    async fn update_golfer_live(&self, id: &str, live: &LiveScore) -> Result<(), StoreError> {
        let mut golfers = self.golfers.write().await;
        let golfer = golfers
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| StoreError::NotFound { collection: "golfers", id: id.to_string() })?;
        golfer.live = live.clone();
        Ok(())
    }

    async fn update_tournament_progress(
        &self,
        id: &str,
        current_round: Option<u32>,
        last_update: i64,
    ) -> Result<(), StoreError> {
        let mut tournaments = self.tournaments.write().await;
        let tournament = tournaments
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound { collection: "tournaments", id: id.to_string() })?;
        if current_round.is_some() {
            tournament.current_round = current_round;
        }
        tournament.last_update = Some(last_update);
        Ok(())
    }

    async fn entries_for_tournament(&self, tournament_id: &str) -> Result<Vec<Entry>, StoreError> {
        let entries = self.entries.read().await;
        let mut matching: Vec<Entry> = entries
            .iter()
            .filter(|e| e.tournament_id == tournament_id)
            .cloned()
            .collect();
        matching.sort_by_key(|e| e.timestamp);
        Ok(matching)
    }

    async fn insert_entry(&self, entry: &Entry) -> Result<(), StoreError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn set_entry_paid(&self, entry_id: &str, paid: bool) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| StoreError::NotFound { collection: "entries", id: entry_id.to_string() })?;
        entry.paid = paid;
        Ok(())
    }

    async fn insert_golfer(&self, golfer: &Golfer) -> Result<(), StoreError> {
        self.golfers.write().await.push(golfer.clone());
        Ok(())
    }

    async fn insert_tournament(&self, tournament: &Tournament) -> Result<(), StoreError> {
        self.tournaments.write().await.push(tournament.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
