// src/ingest/scheduler.rs
use std::sync::{Arc, RwLock};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::task::JoinHandle;

use crate::ingest::config::WallConfig;
use crate::ingest::providers::{
    http_client, launch_api::LaunchApiProvider, news_rss::NewsRssProvider,
    schedule_page::SchedulePageProvider,
};
use crate::ingest::types::{LaunchProvider, NewsProvider};
use crate::wall::WallSnapshot;

pub type SharedSnapshot = Arc<RwLock<WallSnapshot>>;

/// Everything one refresh cycle needs.
pub struct Sources {
    pub launches: Vec<Box<dyn LaunchProvider>>,
    pub news: Vec<Box<dyn NewsProvider>>,
    pub news_limit: usize,
}

impl Sources {
    /// HTTP-backed providers for everything enabled in `cfg`.
    pub fn from_config(cfg: &WallConfig) -> Self {
        let client = http_client(cfg.http_timeout_secs);

        let mut launches: Vec<Box<dyn LaunchProvider>> = Vec::new();
        if cfg.launch_api.enabled {
            launches.push(Box::new(LaunchApiProvider::from_url(
                &cfg.launch_api.url,
                cfg.launch_api.limit,
                client.clone(),
            )));
        }
        if cfg.schedule_page.enabled {
            launches.push(Box::new(SchedulePageProvider::from_url(
                &cfg.schedule_page.url,
                cfg.schedule_page.selectors.clone(),
                client.clone(),
            )));
        }

        let news = cfg
            .news
            .feeds
            .iter()
            .map(|url| Box::new(NewsRssProvider::from_url(url, client.clone())) as Box<dyn NewsProvider>)
            .collect();

        Self {
            launches,
            news,
            news_limit: cfg.news.limit,
        }
    }

    /// One cycle; the result replaces the shared snapshot wholesale.
    pub async fn refresh_into(&self, shared: &SharedSnapshot) {
        let mut rng = StdRng::from_os_rng();
        let snap = crate::ingest::run_once(
            &self.launches,
            &self.news,
            self.news_limit,
            chrono::Utc::now(),
            &mut rng,
        )
        .await;
        let mut guard = shared.write().unwrap_or_else(|e| e.into_inner());
        *guard = snap;
    }
}

/// Owns the background refresh loop; dropping it cancels the task.
#[derive(Debug)]
pub struct RefreshTask {
    handle: JoinHandle<()>,
}

impl RefreshTask {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Refresh `shared` every `interval`, starting one interval from now
/// (callers seed the first snapshot themselves).
pub fn spawn_refresh(sources: Sources, shared: SharedSnapshot, interval: Duration) -> RefreshTask {
    let interval = interval.max(Duration::from_millis(1));
    let handle = tokio::spawn(async move {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sources.refresh_into(&shared).await;
            tracing::debug!(target: "ingest", every_secs = interval.as_secs(), "refresh tick");
        }
    });
    RefreshTask { handle }
}
