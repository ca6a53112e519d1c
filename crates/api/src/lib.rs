mod rate_limit;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::extract::{ConnectInfo, Json, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use wayfarer_agents::{Capabilities, Orchestrator, OrchestratorError, Settings};
use wayfarer_observability::{AppMetrics, MetricsSnapshot};

pub use crate::rate_limit::ClientRateLimiter;

const MAX_CHAT_TEXT_LEN: usize = 4_000;
const MAX_STAY_DAYS: u32 = 365;
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Server-only knobs; everything the agents need lives in [`Settings`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: String,
    pub allowed_origins: Vec<String>,
    pub rate_limit_window: Duration,
    pub rate_limit_max: usize,
    /// Key clients on `x-forwarded-for`; only safe behind a proxy that sets it.
    pub trust_forwarded_for: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max: 60,
            trust_forwarded_for: false,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind: env::var("WAYFARER_BIND").unwrap_or(defaults.bind),
            allowed_origins: env::var("WAYFARER_ALLOWED_ORIGINS")
                .ok()
                .map(|value| {
                    value
                        .split(',')
                        .map(|origin| origin.trim().trim_end_matches('/').to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect::<Vec<_>>()
                })
                .filter(|origins| !origins.is_empty())
                .unwrap_or(defaults.allowed_origins),
            rate_limit_window: env::var("WAYFARER_RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit_window),
            rate_limit_max: env::var("WAYFARER_RATE_LIMIT_MAX")
                .ok()
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(defaults.rate_limit_max),
            trust_forwarded_for: env::var("WAYFARER_TRUST_FORWARDED_FOR")
                .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
                .unwrap_or(defaults.trust_forwarded_for),
        }
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
    pub limiter: ClientRateLimiter,
    allowed_origins: Arc<Vec<String>>,
    trust_forwarded_for: bool,
}

impl ApiState {
    pub fn new(orchestrator: Arc<Orchestrator>, config: &ApiConfig) -> Self {
        Self {
            orchestrator,
            limiter: ClientRateLimiter::new(config.rate_limit_window, config.rate_limit_max),
            allowed_origins: Arc::new(config.allowed_origins.clone()),
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    fn metrics(&self) -> &Arc<AppMetrics> {
        self.orchestrator.metrics()
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    text: String,
}

#[derive(Debug, Deserialize)]
struct BudgetRequest {
    total: f64,
}

#[derive(Debug, Deserialize)]
struct QuoteRequest {
    text: String,
}

#[derive(Debug, Deserialize)]
struct VisaRequest {
    nationality: String,
    destination: String,
    #[serde(default)]
    stay_days: Option<u32>,
    #[serde(default)]
    purpose: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: MetricsSnapshot,
    capabilities: Capabilities,
}

pub async fn build_app(settings: &Settings, config: &ApiConfig) -> Result<Router> {
    let orchestrator = Orchestrator::from_settings(settings, AppMetrics::shared()).await?;
    // detached; lives as long as the runtime
    let _ = orchestrator.spawn_cache_purge(CACHE_PURGE_INTERVAL);
    Ok(build_router(ApiState::new(Arc::new(orchestrator), config)))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/chat", post(chat))
        .route("/v1/budget", post(budget))
        .route("/v1/trip_quote", post(trip_quote))
        .route("/v1/visa", post(visa))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        // outermost, so rejections carry CORS headers too
        .layer(build_cors_layer(&state.allowed_origins))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics().snapshot(),
        capabilities: state.orchestrator.capabilities(),
    };
    (StatusCode::OK, Json(payload))
}

async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Response {
    if request.text.chars().count() > MAX_CHAT_TEXT_LEN {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "text_too_long",
            format!("text must be at most {MAX_CHAT_TEXT_LEN} characters"),
        );
    }

    match state.orchestrator.handle(&request.text).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => orchestrator_error(err),
    }
}

async fn budget(State(state): State<ApiState>, Json(request): Json<BudgetRequest>) -> Response {
    if !request.total.is_finite() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "total must be a finite number".to_string(),
        );
    }

    (StatusCode::OK, Json(state.orchestrator.budget(request.total))).into_response()
}

async fn trip_quote(State(state): State<ApiState>, Json(request): Json<QuoteRequest>) -> Response {
    match state.orchestrator.quote_trip(&request.text).await {
        Ok(quote) => (StatusCode::OK, Json(quote)).into_response(),
        Err(err) => orchestrator_error(err),
    }
}

async fn visa(State(state): State<ApiState>, Json(request): Json<VisaRequest>) -> Response {
    let nationality = request.nationality.trim();
    let destination = request.destination.trim();
    if nationality.is_empty() || destination.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "nationality and destination are required".to_string(),
        );
    }

    let stay_days = request.stay_days.unwrap_or(30).min(MAX_STAY_DAYS);
    let purpose = request.purpose.as_deref().unwrap_or_default();

    match state
        .orchestrator
        .visa(nationality, destination, stay_days, purpose)
        .await
    {
        Ok(requirement) => (StatusCode::OK, Json(requirement)).into_response(),
        Err(err) => orchestrator_error(err),
    }
}

fn orchestrator_error(err: OrchestratorError) -> Response {
    warn!(error = %err, "request failed");
    match err {
        OrchestratorError::DeadlineExceeded(_) => {
            error_response(StatusCode::GATEWAY_TIMEOUT, "deadline_exceeded", err.to_string())
        }
        OrchestratorError::RequiredAgent { .. } => {
            error_response(StatusCode::BAD_GATEWAY, "agent_failed", err.to_string())
        }
    }
}

fn error_response(status: StatusCode, error: &str, message: String) -> Response {
    (status, Json(json!({ "error": error, "message": message }))).into_response()
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let client = client_address(&request, state.trust_forwarded_for);
    if let Err(retry_after) = state.limiter.check(&client) {
        let mut response = error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded for this client".to_string(),
        );
        if let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().max(1).to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    next.run(request).await
}

fn client_address(request: &Request<Body>, trust_forwarded_for: bool) -> String {
    let forwarded = trust_forwarded_for
        .then(|| request.headers().get("x-forwarded-for"))
        .flatten()
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "local".to_string())
}
