use std::sync::{Arc, RwLock};

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::ingest::scheduler::SharedSnapshot;
use crate::launch::LaunchEvent;
use crate::news::NewsItem;
use crate::noise::{StaticConfig, StaticGenerator};
use crate::wall::{NextView, WallSnapshot};

const STATIC_MIN_DIM: usize = 16;
const STATIC_MAX_DIM: usize = 640;

#[derive(Clone)]
pub struct AppState {
    pub snapshot: SharedSnapshot,
}

impl AppState {
    pub fn new(snapshot: WallSnapshot) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Clone of the current snapshot; a poisoned lock still yields the last value.
    fn current(&self) -> WallSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/wall", get(wall))
        .route("/api/launches", get(launches))
        .route("/api/launches/next", get(next_launch))
        .route("/api/news", get(news))
        .route("/api/ticker", get(ticker))
        .route("/static.pgm", get(static_frame))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn wall(State(state): State<AppState>) -> Json<WallSnapshot> {
    Json(state.current())
}

async fn launches(State(state): State<AppState>) -> Json<Vec<LaunchEvent>> {
    Json(state.current().launches)
}

async fn next_launch(State(state): State<AppState>) -> Json<NextView> {
    Json(state.current().next_view(chrono::Utc::now()))
}

async fn news(State(state): State<AppState>) -> Json<Vec<NewsItem>> {
    Json(state.current().news)
}

#[derive(serde::Serialize)]
struct Headline {
    title: String,
    link: String,
}

#[derive(serde::Serialize)]
struct TickerOut {
    launches: Vec<String>,
    news: Vec<Headline>,
}

async fn ticker(State(state): State<AppState>) -> Json<TickerOut> {
    let snap = state.current();
    Json(TickerOut {
        launches: snap.ticker_lines(),
        news: snap
            .news
            .into_iter()
            .map(|n| Headline {
                title: n.title,
                link: n.link,
            })
            .collect(),
    })
}

#[derive(serde::Deserialize)]
struct StaticQuery {
    w: Option<usize>,
    h: Option<usize>,
}

async fn static_frame(Query(q): Query<StaticQuery>) -> impl IntoResponse {
    let w = q.w.unwrap_or(160).clamp(STATIC_MIN_DIM, STATIC_MAX_DIM);
    let h = q.h.unwrap_or(90).clamp(STATIC_MIN_DIM, STATIC_MAX_DIM);
    let mut generator = StaticGenerator::new(w, h, StaticConfig::default());
    let pgm = generator.render(&mut rand::rng()).to_pgm();
    ([(header::CONTENT_TYPE, "image/x-portable-graymap")], pgm)
}
