// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod countdown;
pub mod ingest;
pub mod launch;
pub mod metrics;
pub mod news;
pub mod noise;
pub mod stream;
pub mod wall;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::launch::{LaunchEvent, Precision};
pub use crate::news::NewsItem;
pub use crate::wall::WallSnapshot;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_FORMAT: &str = "LAUNCH_WALL_LOG_FORMAT";

/// Process-wide setup. Call once at startup, before building providers:
/// loads `.env` and installs the tracing subscriber. Metric descriptions are
/// left to `metrics::Metrics::install`, which needs the recorder in place first.
/// Repeated calls are harmless.
pub fn init() {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();
}

/// Compact logs by default, JSON with `LAUNCH_WALL_LOG_FORMAT=json`.
/// Leaves an already installed subscriber (e.g. the deploy runtime's) alone.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("launch_wall=info,warn"));

    let json = std::env::var(ENV_LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
