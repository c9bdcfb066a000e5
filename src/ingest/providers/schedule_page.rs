// src/ingest/providers/schedule_page.rs
//! Best-effort scraper for an HTML launch schedule page.
//!
//! The page has no stable contract, so every selector is configurable. An entry
//! "block" is the element matched by the entry selector plus its following
//! sibling elements up to the next entry; name/date/time/YouTube links are looked
//! up inside that block.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::ingest::providers::get_text;
use crate::ingest::types::LaunchProvider;
use crate::launch::{DateTextParser, LaunchEvent, ScrapedDateParser};
use crate::stream::{is_youtube, normalize_stream_url};

pub const DEFAULT_SCHEDULE_PAGE_URL: &str = "https://spaceflightnow.com/launch-schedule/";

const YOUTUBE_LINKS: &str = r#"a[href*="youtube.com"], a[href*="youtu.be"]"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSelectors {
    pub entry: String,
    pub name: String,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            entry: ".datename".to_string(),
            name: ".mission".to_string(),
            date: ".launchdate".to_string(),
            time: Some(".missiondata".to_string()),
        }
    }
}

struct CompiledSelectors {
    entry: Selector,
    name: Selector,
    date: Selector,
    time: Option<Selector>,
    links: Selector,
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| anyhow!("invalid CSS selector {s:?}: {e:?}"))
}

impl CompiledSelectors {
    fn compile(cfg: &PageSelectors) -> Result<Self> {
        Ok(Self {
            entry: parse_selector(&cfg.entry)?,
            name: parse_selector(&cfg.name)?,
            date: parse_selector(&cfg.date)?,
            time: cfg.time.as_deref().map(parse_selector).transpose()?,
            links: parse_selector(YOUTUBE_LINKS)?,
        })
    }
}

pub struct SchedulePageProvider {
    name: String,
    selectors: PageSelectors,
    parser: Box<dyn DateTextParser>,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl SchedulePageProvider {
    pub fn from_fixture(html: &str, selectors: PageSelectors) -> Self {
        Self {
            name: "SchedulePage".to_string(),
            selectors,
            parser: Box::new(ScrapedDateParser),
            mode: Mode::Fixture(html.to_string()),
        }
    }

    pub fn from_url(url: &str, selectors: PageSelectors, client: reqwest::Client) -> Self {
        Self {
            name: "SchedulePage".to_string(),
            selectors,
            parser: Box::new(ScrapedDateParser),
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
        }
    }

    /// Swap the date heuristic (tests, or a page with a different date style).
    pub fn with_parser(mut self, parser: Box<dyn DateTextParser>) -> Self {
        self.parser = parser;
        self
    }

    fn parse_page(&self, html: &str, now: DateTime<Utc>) -> Result<Vec<LaunchEvent>> {
        let t0 = std::time::Instant::now();
        let sel = CompiledSelectors::compile(&self.selectors).context("schedule page selectors")?;
        let doc = Html::parse_document(html);

        let mut out = Vec::new();
        for entry in doc.select(&sel.entry) {
            let block = block_elements(entry, &sel.entry);

            let Some(name) = first_text(&block, &sel.name).filter(|n| !n.is_empty()) else {
                continue;
            };
            let date_text = first_text(&block, &sel.date).unwrap_or_default();
            let time_text = sel.time.as_ref().and_then(|t| first_text(&block, t));
            let stream = first_youtube_link(&block, &sel.links);

            let parsed = self.parser.parse(&date_text, time_text.as_deref(), now);
            out.push(LaunchEvent::from_parsed(
                &self.name, &name, &date_text, parsed, stream,
            ));
        }

        if out.is_empty() {
            tracing::warn!(target: "ingest", provider = %self.name, "no entries matched schedule selectors");
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_launches_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl LaunchProvider for SchedulePageProvider {
    async fn fetch_launches(&self, now: DateTime<Utc>) -> Result<Vec<LaunchEvent>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_page(s, now),
            Mode::Http { url, client } => {
                let body = get_text(client, url).await?;
                self.parse_page(&body, now)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// The entry element followed by its sibling elements, up to the next entry.
fn block_elements<'a>(entry: ElementRef<'a>, entry_sel: &Selector) -> Vec<ElementRef<'a>> {
    let mut out = vec![entry];
    for sib in entry.next_siblings() {
        let Some(el) = ElementRef::wrap(sib) else {
            continue;
        };
        if entry_sel.matches(&el) || el.select(entry_sel).next().is_some() {
            break;
        }
        out.push(el);
    }
    out
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(block: &[ElementRef<'_>], sel: &Selector) -> Option<String> {
    block.iter().find_map(|el| {
        if sel.matches(el) {
            Some(element_text(*el))
        } else {
            el.select(sel).next().map(element_text)
        }
    })
}

fn first_youtube_link(block: &[ElementRef<'_>], links: &Selector) -> Option<String> {
    block
        .iter()
        .flat_map(|el| el.select(links))
        .filter_map(|a| a.value().attr("href"))
        .find(|href| is_youtube(href))
        .map(normalize_stream_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::ParsedDate;
    use chrono::TimeZone;

    struct AlwaysUnknown;

    impl DateTextParser for AlwaysUnknown {
        fn parse(&self, date_text: &str, _t: Option<&str>, _now: DateTime<Utc>) -> ParsedDate {
            ParsedDate::unknown(date_text)
        }
    }

    const PAGE: &str = r#"
        <div class="datename"><span class="launchdate">NET Aug. 14</span><span class="mission">Alpha</span></div>
        <div class="missiondata">Launch time: 1430 GMT</div>
        <p><a href="https://www.youtube.com/watch?v=one">Watch</a></p>
        <div class="datename"><span class="launchdate">Aug. 20</span><span class="mission">Beta</span></div>
        <div class="missiondata">Launch time: TBD</div>
    "#;

    #[tokio::test]
    async fn links_stay_inside_their_block() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let p = SchedulePageProvider::from_fixture(PAGE, PageSelectors::default());
        let v = p.fetch_launches(now).await.unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].name, "Alpha");
        assert_eq!(v[0].stream_url.as_deref(), Some("https://www.youtube.com/embed/one"));
        assert_eq!(v[0].display_text, "NET Aug 14, 2025 14:30 UTC");
        assert_eq!(v[1].stream_url, None);
        assert_eq!(v[1].status, "TBD");
    }

    #[tokio::test]
    async fn parser_can_be_swapped() {
        let p = SchedulePageProvider::from_fixture(PAGE, PageSelectors::default())
            .with_parser(Box::new(AlwaysUnknown));
        let v = p.fetch_launches(Utc::now()).await.unwrap();
        assert!(v.iter().all(|e| e.sort_timestamp.is_none()));
    }

    #[tokio::test]
    async fn bad_selector_is_an_error() {
        let sel = PageSelectors {
            entry: "[[".into(),
            ..PageSelectors::default()
        };
        let p = SchedulePageProvider::from_fixture(PAGE, sel);
        assert!(p.fetch_launches(Utc::now()).await.is_err());
    }
}
