// src/stream.rs
//! Livestream link helpers.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_WATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)youtube\.com/watch\?(?:.*&)?v=([^&#]+)").expect("watch regex"));
static RE_SHORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)youtu\.be/([^?&#/]+)").expect("short link regex"));

/// Rewrite YouTube watch/short links to their embeddable form. Anything else
/// (including links that are already embeds) passes through unchanged.
pub fn normalize_stream_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.to_ascii_lowercase().contains("/embed/") {
        return raw.to_string();
    }
    let id = RE_WATCH
        .captures(raw)
        .or_else(|| RE_SHORT.captures(raw))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    match id {
        Some(id) if !id.is_empty() => format!("https://www.youtube.com/embed/{id}"),
        _ => raw.to_string(),
    }
}

/// True for links the wall can embed as a YouTube player.
pub fn is_youtube(url: &str) -> bool {
    let u = url.to_ascii_lowercase();
    u.contains("youtube.com/") || u.contains("youtu.be/")
}
