// src/ingest/providers/mod.rs
pub mod launch_api;
pub mod news_rss;
pub mod schedule_page;

/// Shared HTTP client with the configured request timeout.
pub fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs.max(1)))
        .user_agent(concat!("launch-wall/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = ?e, "http client builder failed; using defaults");
            reqwest::Client::new()
        })
}

/// GET `url` and return the body, failing on transport errors and non-2xx statuses.
pub(crate) async fn get_text(client: &reqwest::Client, url: &str) -> anyhow::Result<String> {
    use anyhow::Context;
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("http get {url}"))?
        .error_for_status()
        .with_context(|| format!("http status {url}"))?;
    resp.text()
        .await
        .with_context(|| format!("http body {url}"))
}
