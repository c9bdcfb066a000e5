//! # Wall Snapshot
//! Immutable per-refresh view model: sorted schedule, chosen next launch, news.
//!
//! A snapshot is built once per refresh cycle and swapped in whole; readers
//! clone out of it and never see a half-updated wall.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::countdown::{countdown_for, NO_PRECISE_TIME};
use crate::launch::{select_next, to_iso_millis, LaunchEvent};
use crate::news::NewsItem;

pub const NO_LAUNCHES: &str = "No upcoming launches found.";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WallSnapshot {
    pub generated_at: String,
    pub launches: Vec<LaunchEvent>,
    pub next_launch: Option<LaunchEvent>,
    pub news: Vec<NewsItem>,
}

/// What the main panel shows: either a launch (with countdown or the
/// no-precise-time notice) or the explicit empty state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextView {
    pub launch: Option<LaunchEvent>,
    pub countdown: Option<String>,
    pub message: Option<String>,
}

impl WallSnapshot {
    /// `launches` must already be deduplicated and sorted.
    pub fn build(launches: Vec<LaunchEvent>, news: Vec<NewsItem>, now: DateTime<Utc>) -> Self {
        let next_launch = select_next(&launches, now).cloned();
        Self {
            generated_at: to_iso_millis(&now),
            launches,
            next_launch,
            news,
        }
    }

    pub fn empty(now: DateTime<Utc>) -> Self {
        Self::build(Vec::new(), Vec::new(), now)
    }

    pub fn is_empty(&self) -> bool {
        self.launches.is_empty()
    }

    /// Next-launch panel state at `now` (countdown is recomputed per call).
    pub fn next_view(&self, now: DateTime<Utc>) -> NextView {
        match &self.next_launch {
            None => NextView {
                launch: None,
                countdown: None,
                message: Some(NO_LAUNCHES.to_string()),
            },
            Some(ev) => {
                let countdown = countdown_for(ev, now).map(|c| c.label());
                NextView {
                    message: countdown.is_none().then(|| NO_PRECISE_TIME.to_string()),
                    countdown,
                    launch: Some(ev.clone()),
                }
            }
        }
    }

    /// Ticker lines: `Aug 20, 14:30 | name` for exact times, display text otherwise.
    pub fn ticker_lines(&self) -> Vec<String> {
        self.launches.iter().map(ticker_line).collect()
    }
}

pub fn ticker_line(ev: &LaunchEvent) -> String {
    match ev.iso_timestamp {
        Some(at) => format!("{} | {}", at.format("%b %d, %H:%M"), ev.name),
        None => format!("{} | {}", ev.display_text, ev.name),
    }
}
