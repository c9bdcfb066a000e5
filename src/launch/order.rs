// src/launch/order.rs
//! Dedup, ordering and "next launch" selection over normalized events.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::LaunchEvent;

/// Drop later events whose id was already seen. Returns (kept, dropped_count).
pub fn dedup_by_id(events: Vec<LaunchEvent>) -> (Vec<LaunchEvent>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(events.len());
    let mut keep = Vec::with_capacity(events.len());
    let mut dropped = 0usize;
    for ev in events {
        if !seen.insert(ev.id.clone()) {
            dropped += 1;
            continue;
        }
        keep.push(ev);
    }
    (keep, dropped)
}

/// Sort timestamp ascending (missing last), then name. Stable.
pub fn compare_launches(a: &LaunchEvent, b: &LaunchEvent) -> Ordering {
    let ka = (a.sort_timestamp.is_none(), a.sort_timestamp);
    let kb = (b.sort_timestamp.is_none(), b.sort_timestamp);
    ka.cmp(&kb).then_with(|| a.name.cmp(&b.name))
}

pub fn sort_launches(events: &mut [LaunchEvent]) {
    events.sort_by(compare_launches);
}

/// First event at or after `now`; else the first event; `None` only for an empty list.
pub fn select_next(sorted: &[LaunchEvent], now: DateTime<Utc>) -> Option<&LaunchEvent> {
    let now_ms = now.timestamp_millis();
    sorted
        .iter()
        .find(|ev| ev.sort_timestamp.is_some_and(|ts| ts >= now_ms))
        .or_else(|| sorted.first())
}
