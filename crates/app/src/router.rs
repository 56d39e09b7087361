use std::{sync::Arc, time::Instant};

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use domain_triage_core::{Pipeline, Verdict};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use tracing::info;

use crate::problem::ProblemResponse;
use crate::telemetry;

const BANNER: &str = "Domain Checker API is running!";

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, pipeline: Pipeline) -> Self {
        Self {
            metrics,
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/check", get(check))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

async fn home() -> &'static str {
    BANNER
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

#[derive(Debug, Deserialize)]
struct CheckQuery {
    #[serde(default)]
    domain: Option<String>,
}

async fn check(
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<Verdict>, ProblemResponse> {
    let start = Instant::now();
    let input = query
        .domain
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            ProblemResponse::bad_request("missing_domain", "Please provide a domain parameter")
        })?;

    let verdict = state.pipeline().classify(input).await;

    let elapsed = start.elapsed();
    counter!("domain_checks_total", "status" => verdict.status.metric_label()).increment(1);
    histogram!("domain_check_latency_seconds").record(elapsed.as_secs_f64());
    info!(
        stage = "app",
        input,
        status = verdict.status.as_str(),
        elapsed_ms = elapsed.as_millis() as u64,
        "domain check served"
    );

    Ok(Json(verdict))
}
