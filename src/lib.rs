//! golfpool: golf pool leaderboard engine
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod scores;
pub mod store;
pub mod engine;
pub mod dashboard;
