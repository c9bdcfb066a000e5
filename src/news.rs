//! # News
//! Headline items for the ticker, merged from several RSS feeds.
//!
//! Items are deduplicated by title and shuffled for variety. The shuffle takes
//! the RNG as a parameter so tests can seed it.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Max characters kept from a description/content snippet.
pub const SNIPPET_MAX_CHARS: usize = 240;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub pub_date: Option<String>,
    pub snippet: Option<String>,
    pub source: String,
}

/// How many items each feed may contribute so that `limit` is reachable
/// evenly across `feeds` feeds (at least one).
pub fn per_feed_limit(limit: usize, feeds: usize) -> usize {
    if feeds == 0 {
        return limit.max(1);
    }
    limit.div_ceil(feeds).max(1)
}

/// Keep the first item per case-folded title. Returns (kept, dropped_count).
pub fn dedup_by_title(items: Vec<NewsItem>) -> (Vec<NewsItem>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(items.len());
    let mut dropped = 0usize;
    for it in items {
        if !seen.insert(it.title.trim().to_lowercase()) {
            dropped += 1;
            continue;
        }
        keep.push(it);
    }
    (keep, dropped)
}

/// Shuffle in place with the given RNG, then clamp to `limit`.
pub fn shuffle_and_clamp<R: Rng + ?Sized>(
    mut items: Vec<NewsItem>,
    limit: usize,
    rng: &mut R,
) -> Vec<NewsItem> {
    items.shuffle(rng);
    items.truncate(limit);
    items
}
