// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::launch::LaunchEvent;
use crate::news::NewsItem;

/// Upstream source of launch schedule entries (API, scraped page, fixture).
#[async_trait::async_trait]
pub trait LaunchProvider: Send + Sync {
    /// `now` anchors year inference for date text without a year.
    async fn fetch_launches(&self, now: DateTime<Utc>) -> Result<Vec<LaunchEvent>>;
    fn name(&self) -> &str;
}

/// Upstream source of headlines (RSS feed, fixture).
#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    /// At most `max_items` items, in feed order.
    async fn fetch_news(&self, max_items: usize) -> Result<Vec<NewsItem>>;
    fn name(&self) -> &str;
}
