// tests/ingest_pipeline.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use launch_wall::ingest::providers::launch_api::LaunchApiProvider;
use launch_wall::ingest::providers::news_rss::NewsRssProvider;
use launch_wall::ingest::providers::schedule_page::{PageSelectors, SchedulePageProvider};
use launch_wall::ingest::types::{LaunchProvider, NewsProvider};
use launch_wall::ingest::{collect_launches, collect_news, run_once};
use launch_wall::launch::LaunchEvent;

const API_JSON: &str = include_str!("fixtures/launch_api.json");
const PAGE: &str = include_str!("fixtures/schedule_page.html");
const NEWS_A: &str = include_str!("fixtures/news_rss.xml");
const NEWS_B: &str = include_str!("fixtures/news_rss_second.xml");

struct Offline;

#[async_trait]
impl LaunchProvider for Offline {
    async fn fetch_launches(&self, _now: DateTime<Utc>) -> Result<Vec<LaunchEvent>> {
        Err(anyhow!("connection refused"))
    }
    fn name(&self) -> &str {
        "Offline"
    }
}

#[async_trait]
impl NewsProvider for Offline {
    async fn fetch_news(&self, _max: usize) -> Result<Vec<launch_wall::NewsItem>> {
        Err(anyhow!("503"))
    }
    fn name(&self) -> &str {
        "Offline"
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap()
}

fn launch_providers() -> Vec<Box<dyn LaunchProvider>> {
    vec![
        Box::new(Offline),
        Box::new(LaunchApiProvider::from_fixture(API_JSON)),
        Box::new(SchedulePageProvider::from_fixture(PAGE, PageSelectors::default())),
    ]
}

fn news_providers() -> Vec<Box<dyn NewsProvider>> {
    vec![
        Box::new(NewsRssProvider::from_fixture("SFN", NEWS_A)),
        Box::new(Offline),
        Box::new(NewsRssProvider::from_fixture("Agency", NEWS_B)),
    ]
}

#[tokio::test]
async fn failing_provider_is_skipped_and_duplicates_dropped() {
    let (launches, dedup) = collect_launches(&launch_providers(), now()).await;
    assert_eq!(dedup, 2);
    assert_eq!(launches.len(), 7);

    let names: Vec<_> = launches.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Vulcan \u{2022} USSF-106",
            "Ariane 6 | Example Sat",
            "Electron | Rocket Lab Mission",
            "Falcon 9 Block 5 | Starlink Group 10-30",
            "Falcon 9 \u{2022} Starlink 10-30",
            "H3 \u{2022} HTV-X1",
            "Starship \u{2022} Flight 11",
        ]
    );
    assert!(launches.last().unwrap().sort_timestamp.is_none());
}

#[tokio::test]
async fn news_is_merged_deduped_and_clamped() {
    let mut rng = StdRng::seed_from_u64(7);
    let news = collect_news(&news_providers(), 12, &mut rng).await;
    assert_eq!(news.len(), 4);
    let falcon = news
        .iter()
        .filter(|n| n.title.to_lowercase().contains("falcon 9 launches"))
        .collect::<Vec<_>>();
    assert_eq!(falcon.len(), 1);
    assert_eq!(falcon[0].source, "SFN", "first occurrence wins");

    let mut rng = StdRng::seed_from_u64(7);
    let clamped = collect_news(&news_providers(), 2, &mut rng).await;
    assert_eq!(clamped.len(), 2);
}

#[tokio::test]
async fn same_seed_same_order() {
    let a = collect_news(&news_providers(), 12, &mut StdRng::seed_from_u64(42)).await;
    let b = collect_news(&news_providers(), 12, &mut StdRng::seed_from_u64(42)).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn run_once_builds_snapshot_with_next_launch() {
    let mut rng = StdRng::seed_from_u64(1);
    let snap = run_once(&launch_providers(), &news_providers(), 12, now(), &mut rng).await;

    assert_eq!(snap.generated_at, "2025-08-01T00:00:00.000Z");
    assert_eq!(snap.launches.len(), 7);
    let next = snap.next_launch.as_ref().expect("next launch");
    assert_eq!(next.name, "Vulcan \u{2022} USSF-106");

    let view = snap.next_view(now());
    assert_eq!(view.countdown.as_deref(), Some("T- 13d 23:59:00"));
    assert!(view.message.is_none());
}

#[tokio::test]
async fn all_sources_down_gives_empty_wall() {
    let launches: Vec<Box<dyn LaunchProvider>> = vec![Box::new(Offline)];
    let news: Vec<Box<dyn NewsProvider>> = vec![Box::new(Offline)];
    let snap = run_once(&launches, &news, 12, now(), &mut StdRng::seed_from_u64(0)).await;
    assert!(snap.is_empty());
    assert!(snap.news.is_empty());
    assert!(snap.next_launch.is_none());
}
