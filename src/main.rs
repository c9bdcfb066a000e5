//! Launch Wall: Binary Entrypoint
//! Boots the Axum HTTP server, wiring the refresh loop, shared snapshot, and metrics.

use std::sync::OnceLock;
use std::time::Duration;

use launch_wall::ingest::config::load_config_default;
use launch_wall::ingest::scheduler::{spawn_refresh, RefreshTask, Sources};
use launch_wall::metrics::Metrics;
use launch_wall::{create_router, AppState, WallSnapshot};
use shuttle_axum::ShuttleAxum;

/// Lives for the whole process; dropping it would cancel the refresh loop.
static REFRESH: OnceLock<RefreshTask> = OnceLock::new();

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    launch_wall::init();

    let cfg = load_config_default()?;
    tracing::info!(
        refresh_secs = cfg.refresh_secs,
        feeds = cfg.news.feeds.len(),
        scrape = cfg.schedule_page.enabled,
        "config loaded"
    );

    // Recorder first: the first refresh already records ingest series.
    let metrics = Metrics::install_or_warn(cfg.refresh_secs);

    // First snapshot before serving, so the wall never starts blank when sources are up.
    let sources = Sources::from_config(&cfg);
    let state = AppState::new(WallSnapshot::empty(chrono::Utc::now()));
    sources.refresh_into(&state.snapshot).await;

    let task = spawn_refresh(
        sources,
        state.snapshot.clone(),
        Duration::from_secs(cfg.refresh_secs),
    );
    if REFRESH.set(task).is_err() {
        tracing::warn!("refresh loop already running");
    }

    let mut router = create_router(state);
    if let Some(m) = metrics {
        router = router.merge(m.router());
    }

    Ok(router.into())
}
