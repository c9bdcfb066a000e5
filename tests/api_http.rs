// tests/api_http.rs
//
// HTTP-level tests for the wall Router without opening sockets.
// The router is exercised directly via tower::ServiceExt::oneshot.

use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value as Json;
use tower::ServiceExt as _;

use launch_wall::launch::{DateTextParser, ScrapedDateParser};
use launch_wall::wall::NO_LAUNCHES;
use launch_wall::{create_router, AppState, LaunchEvent, NewsItem, WallSnapshot};

const BODY_LIMIT: usize = 1024 * 1024;

fn router_with(snapshot: WallSnapshot) -> Router {
    create_router(AppState::new(snapshot))
}

fn populated() -> WallSnapshot {
    let now = Utc::now();
    let soon = (now + Duration::days(2)).date_naive().and_hms_opt(14, 30, 0).unwrap().and_utc();
    let exact = LaunchEvent::from_exact("LaunchApi", "Falcon 9 | Starlink", "raw", soon, "Go");
    let later = Utc.with_ymd_and_hms(2099, 8, 14, 0, 0, 0).unwrap();
    let parsed = ScrapedDateParser.parse("NET Aug. 14, 2099", None, later);
    let approx = LaunchEvent::from_parsed("SchedulePage", "Vulcan", "NET Aug. 14, 2099", parsed, None);
    let news = vec![NewsItem {
        title: "Agency selects new astronauts".into(),
        link: "https://agency.example.test/astronauts".into(),
        pub_date: None,
        snippet: None,
        source: "Agency".into(),
    }];
    WallSnapshot::build(vec![exact, approx], news, now)
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, headers, bytes)
}

async fn get_json(app: Router, uri: &str) -> Json {
    let (status, _, bytes) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK, "{uri} should be 200");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_returns_ok() {
    let (status, _, body) = get(router_with(WallSnapshot::empty(Utc::now())), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "OK");
}

#[tokio::test]
async fn empty_wall_reports_no_launches() {
    let v = get_json(router_with(WallSnapshot::empty(Utc::now())), "/api/launches/next").await;
    assert!(v["launch"].is_null());
    assert_eq!(v["message"], NO_LAUNCHES);

    let list = get_json(router_with(WallSnapshot::empty(Utc::now())), "/api/launches").await;
    assert_eq!(list.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn wall_serializes_camel_case_events() {
    let v = get_json(router_with(populated()), "/api/wall").await;
    let launches = v["launches"].as_array().expect("launches array");
    assert_eq!(launches.len(), 2);

    let first = &launches[0];
    assert_eq!(first["name"], "Falcon 9 | Starlink");
    assert_eq!(first["precision"], "exact");
    assert!(first["isoTimestamp"].as_str().unwrap().ends_with("T14:30:00.000Z"));
    assert!(first["sortTimestamp"].is_i64());

    let second = &launches[1];
    assert_eq!(second["precision"], "approximate");
    assert!(second["isoTimestamp"].is_null());
    assert_eq!(second["displayText"], "NET Aug 14, 2099");
    assert_eq!(second["rawDateText"], "NET Aug. 14, 2099");

    assert_eq!(v["nextLaunch"]["name"], "Falcon 9 | Starlink");
    assert!(v["generatedAt"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn next_launch_has_countdown() {
    let v = get_json(router_with(populated()), "/api/launches/next").await;
    assert_eq!(v["launch"]["name"], "Falcon 9 | Starlink");
    let label = v["countdown"].as_str().expect("countdown label");
    assert!(label.starts_with("T- "), "got {label}");
    assert!(v["message"].is_null());
}

#[tokio::test]
async fn news_and_ticker() {
    let news = get_json(router_with(populated()), "/api/news").await;
    assert_eq!(news[0]["title"], "Agency selects new astronauts");

    let t = get_json(router_with(populated()), "/api/ticker").await;
    let lines = t["launches"].as_array().unwrap();
    assert!(lines[0].as_str().unwrap().ends_with(", 14:30 | Falcon 9 | Starlink"));
    assert_eq!(lines[1], "NET Aug 14, 2099 | Vulcan");
    assert_eq!(t["news"][0]["link"], "https://agency.example.test/astronauts");
}

#[tokio::test]
async fn static_frame_is_pgm_with_clamped_size() {
    let app = router_with(WallSnapshot::empty(Utc::now()));
    let (status, headers, body) = get(app, "/static.pgm?w=4&h=5000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "image/x-portable-graymap"
    );
    let header_line = b"P5\n16 640\n255\n";
    assert!(body.starts_with(header_line));
    assert_eq!(body.len(), header_line.len() + 16 * 640);
}
