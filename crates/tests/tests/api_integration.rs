use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wayfarer_agents::{Orchestrator, Settings};
use wayfarer_api::{build_app, build_router, ApiConfig, ApiState};

fn offline_app(config: &ApiConfig) -> Router {
    let orchestrator = Orchestrator::offline(&Settings::offline().with_seed(7));
    build_router(ApiState::new(Arc::new(orchestrator), config))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_capabilities() {
    let app = build_app(&Settings::offline(), &ApiConfig::default())
        .await
        .expect("app should build");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let parsed = read_json(response).await;
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["capabilities"]["llm"], false);
    assert_eq!(parsed["metrics"]["requests_total"], 0);
}

#[tokio::test]
async fn chat_returns_reply_and_intent() {
    let app = offline_app(&ApiConfig::default());

    let response = app
        .oneshot(post_json("/v1/chat", json!({ "text": "Is flight TG101 on time?" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = read_json(response).await;
    assert_eq!(parsed["intent"], "flight_check");
    assert_eq!(parsed["source"], "rules");
    assert!(parsed["reply"].as_str().unwrap().contains("TG101"));
}

#[tokio::test]
async fn chat_rejects_oversized_text() {
    let app = offline_app(&ApiConfig::default());
    let text = "a".repeat(5_000);

    let response = app
        .oneshot(post_json("/v1/chat", json!({ "text": text })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(read_json(response).await["error"], "text_too_long");
}

#[tokio::test]
async fn budget_endpoint_splits_total() {
    let app = offline_app(&ApiConfig::default());

    let response = app
        .oneshot(post_json("/v1/budget", json!({ "total": 10000 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = read_json(response).await;
    assert_eq!(parsed["flight"], 4500);
    assert_eq!(parsed["hotel"], 2500);
    assert_eq!(parsed["food"], 1500);
    assert_eq!(parsed["transport"], 1000);
    assert_eq!(parsed["misc"], 500);
}

#[tokio::test]
async fn visa_requires_both_countries() {
    let app = offline_app(&ApiConfig::default());

    let response = app
        .oneshot(post_json(
            "/v1/visa",
            json!({ "nationality": "  ", "destination": "Japan" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "invalid_request");
}

#[tokio::test]
async fn visa_answers_offline() {
    let app = offline_app(&ApiConfig::default());

    let response = app
        .oneshot(post_json(
            "/v1/visa",
            json!({ "nationality": "Thai", "destination": "Narnia", "stay_days": 10 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert!(parsed["disclaimer"].as_str().is_some_and(|text| !text.is_empty()));
}

#[tokio::test]
async fn trip_quote_totals_fare_and_hotel() {
    let app = offline_app(&ApiConfig::default());

    let response = app
        .oneshot(post_json("/v1/trip_quote", json!({ "text": "hello" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = read_json(response).await;
    let fare = parsed["flight_price"].as_f64().unwrap();
    let hotel = parsed["hotel_total"].as_f64().unwrap();
    let total = parsed["total"].as_f64().unwrap();
    assert!((fare + hotel - total).abs() < 1e-6);
}

#[tokio::test]
async fn rate_limit_returns_retry_after() {
    let config = ApiConfig {
        rate_limit_window: Duration::from_secs(60),
        rate_limit_max: 1,
        ..ApiConfig::default()
    };
    let app = offline_app(&config);

    let first = app
        .clone()
        .oneshot(post_json("/v1/budget", json!({ "total": 1000 })))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .clone()
        .oneshot(post_json("/v1/budget", json!({ "total": 1000 })))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key("retry-after"));

    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

fn budget_from(client: &str, origin: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/v1/budget")
        .header("content-type", "application/json")
        .header("x-forwarded-for", client);
    if let Some(origin) = origin {
        builder = builder.header("origin", origin);
    }
    builder
        .body(Body::from(json!({ "total": 1000 }).to_string()))
        .unwrap()
}

fn single_request_config(trust_forwarded_for: bool) -> ApiConfig {
    ApiConfig {
        rate_limit_max: 1,
        trust_forwarded_for,
        ..ApiConfig::default()
    }
}

#[tokio::test]
async fn forwarded_for_is_ignored_unless_trusted() {
    let app = offline_app(&single_request_config(false));

    let first = app.clone().oneshot(budget_from("203.0.113.1", None)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let spoofed = app.oneshot(budget_from("203.0.113.2", None)).await.unwrap();
    assert_eq!(spoofed.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn trusted_proxy_limits_each_forwarded_client() {
    let app = offline_app(&single_request_config(true));

    let first = app.clone().oneshot(budget_from("203.0.113.1", None)).await.unwrap();
    let second = app.clone().oneshot(budget_from("203.0.113.2", None)).await.unwrap();
    let repeat = app.oneshot(budget_from("203.0.113.1", None)).await.unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(repeat.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn rate_limited_response_keeps_cors_headers() {
    let app = offline_app(&single_request_config(false));
    let origin = "http://localhost:3000";

    app.clone().oneshot(budget_from("x", Some(origin))).await.unwrap();
    let limited = app.oneshot(budget_from("x", Some(origin))).await.unwrap();

    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        limited.headers().get("access-control-allow-origin").unwrap(),
        origin
    );
}

