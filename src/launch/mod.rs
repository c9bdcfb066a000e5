// src/launch/mod.rs
//! Launch schedule model: one `LaunchEvent` per upstream entry, plus the
//! date normalizer and the dedup/sort/select helpers built on top of it.

pub mod normalize;
pub mod order;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

pub use normalize::{DateTextParser, ParsedDate, ScrapedDateParser};
pub use order::{dedup_by_id, select_next, sort_launches};

/// Whether a launch time is known to the minute (explicit UTC/GMT) or only to the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Exact,
    Approximate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchEvent {
    pub id: String,
    pub name: String,
    pub raw_date_text: String,
    pub display_text: String,
    /// Only set when the upstream gave an explicit UTC/GMT time.
    #[serde(serialize_with = "serialize_iso_millis")]
    pub iso_timestamp: Option<DateTime<Utc>>,
    /// Unix milliseconds used purely for ordering; `None` sorts last.
    pub sort_timestamp: Option<i64>,
    pub precision: Precision,
    pub status: String,
    pub stream_url: Option<String>,
    pub image: Option<String>,
    pub source: String,
}

impl LaunchEvent {
    /// Build an event from normalizer output. Timestamps, precision, display
    /// text and status all come from the same `ParsedDate`, so the exact and
    /// sort timestamps cannot disagree.
    pub fn from_parsed(
        source: &str,
        name: &str,
        raw_date_text: &str,
        parsed: ParsedDate,
        stream_url: Option<String>,
    ) -> Self {
        let name = name.trim().to_string();
        let raw = raw_date_text.trim().to_string();
        Self {
            id: derive_id(&name, &raw),
            status: parsed.status().to_string(),
            precision: parsed.precision(),
            sort_timestamp: parsed.sort_millis(),
            iso_timestamp: parsed.exact,
            display_text: parsed.display,
            name,
            raw_date_text: raw,
            stream_url,
            image: None,
            source: source.to_string(),
        }
    }

    /// Build an event whose window start is an exact instant (e.g. RFC 3339 from an API).
    pub fn from_exact(
        source: &str,
        name: &str,
        raw_date_text: &str,
        at: DateTime<Utc>,
        status: &str,
    ) -> Self {
        let mut ev = Self::from_parsed(source, name, raw_date_text, ParsedDate::exact(at), None);
        let status = status.trim();
        if !status.is_empty() {
            ev.status = status.to_string();
        }
        ev
    }

    pub fn is_exact(&self) -> bool {
        self.precision == Precision::Exact
    }
}

/// Deterministic id from case-folded name + raw date text (SHA-256, 16 hex chars).
pub fn derive_id(name: &str, raw_date_text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(name.trim().to_lowercase().as_bytes());
    hasher.update(b"\x1f");
    hasher.update(raw_date_text.trim().to_lowercase().as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// `2025-08-20T14:30:00.000Z`
pub fn to_iso_millis(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_iso_millis<S: Serializer>(
    v: &Option<DateTime<Utc>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match v {
        Some(at) => s.serialize_str(&to_iso_millis(at)),
        None => s.serialize_none(),
    }
}
