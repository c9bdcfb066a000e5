// src/ingest/providers/launch_api.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::ingest::providers::get_text;
use crate::ingest::types::LaunchProvider;
use crate::launch::{LaunchEvent, ParsedDate};
use crate::stream::normalize_stream_url;

pub const DEFAULT_LAUNCH_API_URL: &str = "https://ll.thespacedevs.com/2.2.0/launch/upcoming/";

#[derive(Debug, Deserialize)]
struct Upcoming {
    #[serde(default)]
    results: Vec<ApiLaunch>,
}

#[derive(Debug, Deserialize)]
struct ApiLaunch {
    name: String,
    window_start: Option<String>,
    status: Option<ApiStatus>,
    #[serde(default, rename = "vidURLs")]
    vid_urls: Vec<VidUrl>,
    image: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    name: String,
}

/// Older API versions list bare strings; newer ones list `{ "url": ... }` objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VidUrl {
    Plain(String),
    Object { url: String },
}

impl VidUrl {
    fn url(&self) -> &str {
        match self {
            VidUrl::Plain(s) => s,
            VidUrl::Object { url } => url,
        }
    }
}

fn image_url(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Object(o) => o
            .get("image_url")
            .and_then(|u| u.as_str())
            .map(str::to_string),
        _ => None,
    }
}

/// Listing URL with the `limit` query appended (existing query params are kept).
fn request_url(base: &str, limit: u32) -> Result<reqwest::Url> {
    reqwest::Url::parse_with_params(base, &[("limit", limit.to_string())])
        .with_context(|| format!("launch api url {base}"))
}

/// Launch Library style JSON listing (`results[]` with `window_start`).
pub struct LaunchApiProvider {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        limit: u32,
        client: reqwest::Client,
    },
}

impl LaunchApiProvider {
    pub fn from_fixture(json: &str) -> Self {
        Self {
            name: "LaunchApi".to_string(),
            mode: Mode::Fixture(json.to_string()),
        }
    }

    pub fn from_url(url: &str, limit: u32, client: reqwest::Client) -> Self {
        Self {
            name: "LaunchApi".to_string(),
            mode: Mode::Http {
                url: url.to_string(),
                limit,
                client,
            },
        }
    }

    fn parse_launches_from_str(&self, s: &str) -> Result<Vec<LaunchEvent>> {
        let t0 = std::time::Instant::now();
        let data: Upcoming = serde_json::from_str(s).context("parsing launch api json")?;

        let mut out = Vec::with_capacity(data.results.len());
        for l in data.results {
            let name = l.name.trim();
            if name.is_empty() {
                continue;
            }
            let raw = l.window_start.as_deref().unwrap_or_default();
            let status = l.status.as_ref().map(|s| s.name.as_str()).unwrap_or_default();
            let stream = l.vid_urls.first().map(|v| normalize_stream_url(v.url()));

            let mut ev = match DateTime::parse_from_rfc3339(raw.trim()) {
                Ok(dt) => LaunchEvent::from_exact(&self.name, name, raw, dt.with_timezone(&Utc), status),
                Err(_) => {
                    tracing::debug!(target: "ingest", launch = name, raw, "unparseable window_start");
                    let mut ev = LaunchEvent::from_parsed(&self.name, name, raw, ParsedDate::unknown(raw), None);
                    if !status.trim().is_empty() {
                        ev.status = status.trim().to_string();
                    }
                    ev
                }
            };
            ev.stream_url = stream;
            ev.image = l.image.as_ref().and_then(image_url);
            out.push(ev);
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_launches_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl LaunchProvider for LaunchApiProvider {
    async fn fetch_launches(&self, _now: DateTime<Utc>) -> Result<Vec<LaunchEvent>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_launches_from_str(s),
            Mode::Http { url, limit, client } => {
                let url = request_url(url, *limit)?;
                let body = get_text(client, url.as_str()).await?;
                self.parse_launches_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::Precision;

    #[tokio::test]
    async fn mixed_vid_url_shapes_and_bad_dates() {
        let json = r#"{"results":[
            {"name":"A","window_start":"2025-08-20T14:30:00Z","status":{"name":"Go for Launch"},
             "vidURLs":[{"url":"https://www.youtube.com/watch?v=abc"}],"image":"https://img/a.png"},
            {"name":"B","window_start":"soon","status":{"name":"To Be Determined"},
             "vidURLs":["https://youtu.be/xyz"]},
            {"name":"  ","window_start":"2025-08-21T00:00:00Z"}
        ]}"#;
        let p = LaunchApiProvider::from_fixture(json);
        let v = p.fetch_launches(Utc::now()).await.unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].precision, Precision::Exact);
        assert_eq!(v[0].status, "Go for Launch");
        assert_eq!(v[0].stream_url.as_deref(), Some("https://www.youtube.com/embed/abc"));
        assert_eq!(v[0].image.as_deref(), Some("https://img/a.png"));
        assert!(v[1].sort_timestamp.is_none());
        assert_eq!(v[1].status, "To Be Determined");
        assert_eq!(v[1].stream_url.as_deref(), Some("https://www.youtube.com/embed/xyz"));
    }

    #[test]
    fn request_url_appends_limit() {
        let u = request_url(DEFAULT_LAUNCH_API_URL, 5).unwrap();
        assert_eq!(
            u.as_str(),
            "https://ll.thespacedevs.com/2.2.0/launch/upcoming/?limit=5"
        );
        let u = request_url("https://api.test/upcoming/?mode=list", 3).unwrap();
        assert_eq!(u.as_str(), "https://api.test/upcoming/?mode=list&limit=3");
        assert!(request_url("not a url", 3).is_err());
    }
}
