//! Entry ranking.

use crate::types::Entry;

/// Ranking value for entries that have no computed score yet (even par).
pub const UNSCORED_SENTINEL: i32 = 0;

/// Sort key for an entry: its total score, or even par when unscored.
pub fn ranking_score(entry: &Entry) -> i32 {
    entry.total_score.unwrap_or(UNSCORED_SENTINEL)
}

/// Order entries best (lowest) score first. Ties keep their input order,
/// so entries passed in submission order stay in submission order.
pub fn rank_entries(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by_key(ranking_score);
    entries
}
