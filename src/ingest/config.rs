// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::providers::launch_api::DEFAULT_LAUNCH_API_URL;
use crate::ingest::providers::schedule_page::{PageSelectors, DEFAULT_SCHEDULE_PAGE_URL};

pub const ENV_CONFIG_PATH: &str = "LAUNCH_WALL_CONFIG_PATH";
pub const ENV_REFRESH_SECS: &str = "LAUNCH_WALL_REFRESH_SECS";
pub const ENV_NEWS_LIMIT: &str = "LAUNCH_WALL_NEWS_LIMIT";

const DEFAULT_REFRESH_SECS: u64 = 300;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
const DEFAULT_API_LIMIT: u32 = 10;
const DEFAULT_NEWS_LIMIT: usize = 12;

fn default_refresh_secs() -> u64 {
    DEFAULT_REFRESH_SECS
}
fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchApiCfg {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "LaunchApiCfg::default_url")]
    pub url: String,
    #[serde(default = "LaunchApiCfg::default_limit")]
    pub limit: u32,
}

impl LaunchApiCfg {
    fn default_url() -> String {
        DEFAULT_LAUNCH_API_URL.to_string()
    }
    fn default_limit() -> u32 {
        DEFAULT_API_LIMIT
    }
}

impl Default for LaunchApiCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            url: Self::default_url(),
            limit: DEFAULT_API_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePageCfg {
    /// Scraping is brittle; off unless asked for.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "SchedulePageCfg::default_url")]
    pub url: String,
    #[serde(default)]
    pub selectors: PageSelectors,
}

impl SchedulePageCfg {
    fn default_url() -> String {
        DEFAULT_SCHEDULE_PAGE_URL.to_string()
    }
}

impl Default for SchedulePageCfg {
    fn default() -> Self {
        Self {
            enabled: false,
            url: Self::default_url(),
            selectors: PageSelectors::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsCfg {
    #[serde(default = "NewsCfg::default_feeds")]
    pub feeds: Vec<String>,
    #[serde(default = "NewsCfg::default_limit")]
    pub limit: usize,
}

impl NewsCfg {
    fn default_feeds() -> Vec<String> {
        vec![
            "https://spaceflightnow.com/feed/".to_string(),
            "https://www.nasa.gov/news-release/feed/".to_string(),
        ]
    }
    fn default_limit() -> usize {
        DEFAULT_NEWS_LIMIT
    }
}

impl Default for NewsCfg {
    fn default() -> Self {
        Self {
            feeds: Self::default_feeds(),
            limit: DEFAULT_NEWS_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallConfig {
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub launch_api: LaunchApiCfg,
    #[serde(default)]
    pub schedule_page: SchedulePageCfg,
    #[serde(default)]
    pub news: NewsCfg,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            refresh_secs: DEFAULT_REFRESH_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            launch_api: LaunchApiCfg::default(),
            schedule_page: SchedulePageCfg::default(),
            news: NewsCfg::default(),
        }
    }
}

impl WallConfig {
    /// Zero intervals/limits fall back to defaults; feeds are trimmed and
    /// de-duplicated preserving order.
    fn sanitize(mut self) -> Self {
        if self.refresh_secs == 0 {
            self.refresh_secs = DEFAULT_REFRESH_SECS;
        }
        if self.http_timeout_secs == 0 {
            self.http_timeout_secs = DEFAULT_HTTP_TIMEOUT_SECS;
        }
        if self.launch_api.limit == 0 {
            self.launch_api.limit = DEFAULT_API_LIMIT;
        }
        if self.news.limit == 0 {
            self.news.limit = DEFAULT_NEWS_LIMIT;
        }
        self.news.feeds = clean_list(std::mem::take(&mut self.news.feeds));
        self
    }

    fn apply_env(mut self) -> Self {
        if let Some(v) = env_parse::<u64>(ENV_REFRESH_SECS) {
            self.refresh_secs = v;
        }
        if let Some(v) = env_parse::<usize>(ENV_NEWS_LIMIT) {
            self.news.limit = v;
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<WallConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    Ok(parse_config(&content, ext.as_str())?.apply_env().sanitize())
}

/// Load config using env var + fallbacks:
/// 1) $LAUNCH_WALL_CONFIG_PATH
/// 2) config/launch_wall.toml
/// 3) config/launch_wall.json
/// 4) built-in defaults
pub fn load_config_default() -> Result<WallConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/launch_wall.toml");
    if toml_p.exists() {
        return load_config_from(&toml_p);
    }
    let json_p = PathBuf::from("config/launch_wall.json");
    if json_p.exists() {
        return load_config_from(&json_p);
    }
    Ok(WallConfig::default().apply_env().sanitize())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<WallConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("parsing json config");
    }
    if hint_ext == "toml" {
        return toml::from_str(s).context("parsing toml config");
    }
    // Unknown extension: try TOML, then JSON
    if let Ok(v) = toml::from_str::<WallConfig>(s) {
        return Ok(v);
    }
    serde_json::from_str(s).map_err(|_| anyhow!("unsupported config format"))
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}
