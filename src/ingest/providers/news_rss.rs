// src/ingest/providers/news_rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    OffsetDateTime, UtcOffset,
};

use crate::ingest::normalize_text;
use crate::ingest::providers::get_text;
use crate::ingest::types::NewsProvider;
use crate::news::{NewsItem, SNIPPET_MAX_CHARS};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<Guid>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "content:encoded")]
    content_encoded: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "@isPermaLink")]
    is_perma_link: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

impl Guid {
    fn permalink(&self) -> Option<&str> {
        let perma = self
            .is_perma_link
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        if perma {
            self.value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        } else {
            None
        }
    }
}

/// RFC 2822 → RFC 3339 (UTC); anything unparseable is kept as cleaned text.
fn normalize_pub_date(raw: &str) -> Option<String> {
    let raw = normalize_text(raw);
    if raw.is_empty() {
        return None;
    }
    OffsetDateTime::parse(&raw, &Rfc2822)
        .ok()
        .and_then(|dt| dt.to_offset(UtcOffset::UTC).format(&Rfc3339).ok())
        .or(Some(raw))
}

fn truncate_chars(s: String, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s
    }
}

pub struct NewsRssProvider {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl NewsRssProvider {
    pub fn from_fixture(name: &str, xml: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(url: &str, client: reqwest::Client) -> Self {
        Self {
            name: url.to_string(),
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
        }
    }

    fn parse_items_from_str(&self, s: &str, max_items: usize) -> Result<Vec<NewsItem>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing news rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len().min(max_items));
        for it in rss.channel.item {
            if out.len() >= max_items {
                break;
            }
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }

            let link = it
                .link
                .as_deref()
                .map(normalize_text)
                .filter(|l| !l.is_empty())
                .or_else(|| it.guid.as_ref().and_then(Guid::permalink).map(str::to_string))
                .unwrap_or_else(|| "#".to_string());

            let snippet = [it.description.as_deref(), it.content_encoded.as_deref()]
                .into_iter()
                .flatten()
                .map(normalize_text)
                .find(|s| !s.is_empty())
                .map(|s| truncate_chars(s, SNIPPET_MAX_CHARS));

            out.push(NewsItem {
                title,
                link,
                pub_date: it.pub_date.as_deref().and_then(normalize_pub_date),
                snippet,
                source: self.name.clone(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_news_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl NewsProvider for NewsRssProvider {
    async fn fetch_news(&self, max_items: usize) -> Result<Vec<NewsItem>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s, max_items),
            Mode::Http { url, client } => {
                let body = get_text(client, url).await?;
                self.parse_items_from_str(&body, max_items)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// HTML entities that are not predefined in XML would make the parser bail.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
