// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::ingest::types::{LaunchProvider, NewsProvider};
use crate::launch::{dedup_by_id, sort_launches, LaunchEvent};
use crate::news::{dedup_by_title, per_feed_limit, shuffle_and_clamp, NewsItem};
use crate::wall::WallSnapshot;
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use rand::Rng;

/// One-time metrics registration (so series show up on /metrics).
/// Called from `Metrics::install` once the recorder exists; later calls are no-ops.
pub fn describe_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_launches_total",
            "Launch entries parsed from providers."
        );
        describe_counter!("ingest_news_total", "News items parsed from feeds.");
        describe_counter!(
            "ingest_dedup_total",
            "Entries removed as duplicates (launch id or news title)."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_counter!("ingest_runs_total", "Completed refresh cycles.");
        describe_histogram!("ingest_parse_ms", "Provider parse time in milliseconds.");
        describe_gauge!(
            "ingest_pipeline_last_run_ts",
            "Unix ts when ingest pipeline last ran."
        );
    });
}

/// Normalize feed text: decode entities, strip tags, fold quotes and whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Merge launch providers: skip failing ones, dedup by id, sort.
/// Returns (sorted launches, dedup count).
pub async fn collect_launches(
    providers: &[Box<dyn LaunchProvider>],
    now: DateTime<Utc>,
) -> (Vec<LaunchEvent>, usize) {
    let mut raw = Vec::new();
    for p in providers {
        match p.fetch_launches(now).await {
            Ok(mut v) => {
                tracing::debug!(target: "ingest", provider = p.name(), count = v.len(), "launches fetched");
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "launch provider error");
                counter!("ingest_provider_errors_total").increment(1);
            }
        }
    }

    let (mut kept, dedup_cnt) = dedup_by_id(raw);
    sort_launches(&mut kept);
    counter!("ingest_dedup_total").increment(dedup_cnt as u64);
    (kept, dedup_cnt)
}

/// Merge feeds: each contributes at most its share of `limit`, then titles are
/// deduplicated, shuffled with `rng` and clamped to `limit`.
pub async fn collect_news<R: Rng + ?Sized>(
    providers: &[Box<dyn NewsProvider>],
    limit: usize,
    rng: &mut R,
) -> Vec<NewsItem> {
    let per_feed = per_feed_limit(limit, providers.len());
    let mut raw = Vec::new();
    for p in providers {
        match p.fetch_news(per_feed).await {
            Ok(mut v) => raw.append(&mut v),
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "news feed error");
                counter!("ingest_provider_errors_total").increment(1);
            }
        }
    }

    let (kept, dedup_cnt) = dedup_by_title(raw);
    counter!("ingest_dedup_total").increment(dedup_cnt as u64);
    shuffle_and_clamp(kept, limit, rng)
}

/// Run every provider once and build an immutable snapshot for this cycle.
pub async fn run_once<R: Rng + ?Sized>(
    launch_providers: &[Box<dyn LaunchProvider>],
    news_providers: &[Box<dyn NewsProvider>],
    news_limit: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> WallSnapshot {
    let (launches, dedup) = collect_launches(launch_providers, now).await;
    let news = collect_news(news_providers, news_limit, rng).await;

    // Telemetry
    counter!("ingest_runs_total").increment(1);
    gauge!("ingest_pipeline_last_run_ts").set(now.timestamp().max(0) as f64);

    tracing::info!(
        target: "ingest",
        launches = launches.len(),
        dedup = dedup,
        news = news.len(),
        "refresh complete"
    );

    WallSnapshot::build(launches, news, now)
}
