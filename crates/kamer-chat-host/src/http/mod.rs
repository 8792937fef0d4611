pub mod chat;
pub mod health;
pub mod middleware;

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router, middleware as axum_middleware};

use self::health::HealthState;
use crate::chat::ChatService;
use crate::chat_metrics::{ChatMetrics, ChatMetricsSnapshot};

pub const CHAT_PATH: &str = "/api/chat";
pub const HEALTH_PATH: &str = "/healthz";
pub const METRICS_PATH: &str = "/metrics";

/// Allowed origin echoed in `Access-Control-Allow-Origin`.
#[derive(Clone, Debug)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
}

impl CorsPolicy {
    pub fn new(origin: &str) -> anyhow::Result<Self> {
        let allow_origin = HeaderValue::from_str(origin.trim())
            .map_err(|_| anyhow::anyhow!("CORS origin `{origin}` is not a valid header value"))?;
        Ok(Self { allow_origin })
    }

    pub fn allow_origin(&self) -> &HeaderValue {
        &self.allow_origin
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_origin: HeaderValue::from_static("*"),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub service: ChatService,
    pub health: HealthState,
    pub cors: Arc<CorsPolicy>,
}

impl AppState {
    pub fn metrics(&self) -> &Arc<ChatMetrics> {
        self.service.metrics()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(CHAT_PATH, post(chat::chat))
        .route(HEALTH_PATH, get(health::healthz))
        .route(METRICS_PATH, get(metrics))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::apply_cors,
        ))
        .layer(axum_middleware::from_fn(middleware::log_request))
        .with_state(state)
}

async fn metrics(State(state): State<AppState>) -> Json<ChatMetricsSnapshot> {
    Json(state.metrics().snapshot())
}
