//! golfpool: golf pool leaderboard server
//!
//! Entry point. Loads configuration, initialises structured logging,
//! opens the document store, and keeps the standings fresh on a timer
//! while serving them over HTTP, with graceful shutdown.

use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use golfpool::config::AppConfig;
use golfpool::dashboard::{self, routes::DashboardState};
use golfpool::engine::{LeaderboardEngine, RefreshTask, ScoreRefresher, ScoreSyncer};
use golfpool::scores::rapidapi::RapidApiClient;
use golfpool::store::{DocumentStore, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load("config.toml")?;
    init_logging();

    info!(
        pool = %cfg.pool.name,
        event_id = cfg.scores.event_id,
        refresh_interval_secs = cfg.refresh.interval_secs,
        "golfpool starting up"
    );

    // -- Components --------------------------------------------------------

    let store: Arc<dyn DocumentStore> = Arc::new(
        SqliteStore::connect(&cfg.store.url, cfg.store.max_connections)
            .await
            .with_context(|| format!("Failed to open store at {}", cfg.store.url))?,
    );

    let api_key = AppConfig::resolve_env(&cfg.scores.api_key_env).unwrap_or_else(|_| {
        warn!(
            env = %cfg.scores.api_key_env,
            "Scores API key not set; upstream syncs will be rejected"
        );
        String::new()
    });
    let provider = RapidApiClient::new(
        SecretString::new(api_key),
        cfg.scores.host.clone(),
        cfg.scores.event_id,
        Duration::from_secs(cfg.scores.timeout_secs),
    )?;

    let refresher = ScoreRefresher::new(
        ScoreSyncer::new(store.clone(), Arc::new(provider)),
        cfg.refresh_interval()?,
    );
    let engine = Arc::new(LeaderboardEngine::new(
        store.clone(),
        refresher,
        cfg.prize_schedule(),
    ));

    let refresh_task = RefreshTask::spawn(
        engine.clone(),
        Duration::from_secs(cfg.refresh.task_period_secs),
    );

    if cfg.dashboard.enabled {
        let state = Arc::new(DashboardState {
            pool_name: cfg.pool.name.clone(),
            engine: engine.clone(),
            store: store.clone(),
        });
        dashboard::spawn_dashboard(state, cfg.dashboard.port).await?;
    }

    // -- Run until interrupted ----------------------------------------------

    info!("Serving. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutdown signal received.");
    refresh_task.stop().await;
    info!("golfpool shut down cleanly.");

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("golfpool=info"));

    let json_logging = std::env::var("GOLFPOOL_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
