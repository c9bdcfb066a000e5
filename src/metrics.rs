//! Prometheus exposition for the wall.
//!
//! The recorder has to be installed before anything describes or records a
//! series: descriptions sent to the default no-op recorder are gone for good.
//! `main` therefore installs it right after config load and before the first
//! refresh cycle.

use anyhow::anyhow;
use axum::{http::header, routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::ingest;

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Clone)]
pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global recorder, describe every wall series and publish the
    /// configured refresh interval. Fails when a recorder is already installed.
    pub fn install(refresh_secs: u64) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow!("prometheus: install recorder: {e}"))?;

        ingest::describe_metrics();
        describe_gauge!(
            "wall_refresh_interval_secs",
            "Configured interval between refresh cycles."
        );
        gauge!("wall_refresh_interval_secs").set(refresh_secs as f64);

        Ok(Self { handle })
    }

    /// Startup variant: a failed install is logged and the service runs without `/metrics`.
    pub fn install_or_warn(refresh_secs: u64) -> Option<Self> {
        match Self::install(refresh_secs) {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!(error = ?e, "metrics endpoint disabled");
                None
            }
        }
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// `/metrics` in the Prometheus text format.
    pub fn router(&self) -> Router {
        let metrics = self.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let m = metrics.clone();
                async move { ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], m.render()) }
            }),
        )
    }
}
