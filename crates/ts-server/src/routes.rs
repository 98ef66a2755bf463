//! HTTP route handlers for the TrialStat server.
//!
//! All endpoints live under `/v1/`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use ts_core::{AnalysisConfig, AnalysisReport, Dataset, ReportError};
use ts_viz::ChartSet;

use crate::state::SharedState;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/v1/analyze", post(analyze_handler))
        .route("/v1/template", get(template_handler))
        .route("/v1/schema", get(schema_handler))
        .route("/v1/health", get(health_handler))
}

// ---------------------------------------------------------------------------
// POST /v1/analyze
// ---------------------------------------------------------------------------

/// JSON form of an analysis request. A non-JSON body is read as the CSV itself.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalyzeRequest {
    /// Filled template as CSV text.
    csv: String,

    /// Analysis settings (every field optional).
    #[serde(default)]
    config: AnalysisConfig,
}

/// Response body for `/v1/analyze`.
#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    report: AnalysisReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    charts: Option<ChartSet>,
    wall_time_s: f64,
}

async fn analyze_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    state.inflight.fetch_add(1, Ordering::Relaxed);
    let _dec = DecrementOnDrop(&state.inflight);
    state.total_requests.fetch_add(1, Ordering::Relaxed);

    let (csv, config) = parse_request(&headers, &body)?;

    let result = run_blocking(state.analysis_timeout, move || {
        let t0 = Instant::now();
        let (report, charts) = analyze_csv(&csv, &config)?;
        Ok(AnalyzeResponse { report, charts, wall_time_s: t0.elapsed().as_secs_f64() })
    })
    .await;

    let resp = match result {
        Ok(resp) => resp,
        Err(err) => {
            if err.status == StatusCode::SERVICE_UNAVAILABLE {
                state.timed_out.fetch_add(1, Ordering::Relaxed);
            }
            tracing::warn!(status = %err.status, "analyze request failed: {}", err.message);
            return Err(err);
        }
    };

    let status = if resp.report.summary().is_some() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(resp)).into_response())
}

fn parse_request(headers: &HeaderMap, body: &[u8]) -> Result<(String, AnalysisConfig), AppError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if is_json {
        let req: AnalyzeRequest = serde_json::from_slice(body)
            .map_err(|e| AppError::bad_request(format!("invalid analyze request JSON: {e}")))?;
        Ok((req.csv, req.config))
    } else {
        let csv = std::str::from_utf8(body)
            .map_err(|e| AppError::bad_request(format!("CSV body is not UTF-8: {e}")))?;
        Ok((csv.to_string(), AnalysisConfig::default()))
    }
}

/// Validate, analyse and (for a completed analysis) build the chart set.
fn analyze_csv(
    csv: &str,
    config: &AnalysisConfig,
) -> Result<(AnalysisReport, Option<ChartSet>), AppError> {
    config.validate().map_err(|e| AppError::bad_request(e.to_string()))?;
    let dataset = Dataset::from_csv_str(csv)
        .map_err(|e| AppError::bad_request(format!("could not parse CSV: {e}")))?;

    let clean = match ts_inference::validate(&dataset) {
        Ok(clean) => clean,
        Err(err) => return Ok((AnalysisReport::Failed { error: ReportError::from(&err) }, None)),
    };
    let report = AnalysisReport::from(ts_inference::analyze_clean(&clean, config));
    let charts = report.summary().map(|_| ts_viz::build_chart_set(&clean));
    Ok((report, charts))
}

/// Run `f` on the blocking pool, giving up after `timeout`.
///
/// A timed-out task keeps running to completion; its result is dropped.
async fn run_blocking<T, F>(timeout: Duration, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(AppError::internal(format!("task panicked: {e}"))),
        Err(_) => Err(AppError::unavailable(format!(
            "analysis did not finish within {:.1} s; retry with a smaller dataset",
            timeout.as_secs_f64()
        ))),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/template, GET /v1/schema
// ---------------------------------------------------------------------------

async fn template_handler() -> Result<Response, AppError> {
    let csv = ts_core::dataset::template_csv().map_err(|e| AppError::internal(e.to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"trialstat_template.csv\""),
        ],
        csv,
    )
        .into_response())
}

async fn schema_handler() -> Json<ts_core::SchemaGuide> {
    Json(ts_core::schema::guide())
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_s: f64,
    analysis_timeout_s: f64,
    inflight: u64,
    total_requests: u64,
    timed_out: u64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: ts_core::VERSION,
        uptime_s: state.started_at.elapsed().as_secs_f64(),
        analysis_timeout_s: state.analysis_timeout.as_secs_f64(),
        inflight: state.inflight.load(Ordering::Relaxed),
        total_requests: state.total_requests.load(Ordering::Relaxed),
        timed_out: state.timed_out.load(Ordering::Relaxed),
    })
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Structured JSON error response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn bad_request(msg: String) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: msg }
    }

    fn unavailable(msg: String) -> Self {
        Self { status: StatusCode::SERVICE_UNAVAILABLE, message: msg }
    }

    fn internal(msg: String) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: msg }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

/// RAII guard to decrement an atomic counter on drop.
struct DecrementOnDrop<'a>(&'a AtomicU64);

impl Drop for DecrementOnDrop<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::HeaderValue;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn state() -> SharedState {
        Arc::new(AppState::new(Duration::from_secs(30)))
    }

    fn fixture(name: &str) -> String {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures").join(name);
        std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
    }

    fn json_headers() -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        h
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_csv_body() {
        let st = state();
        let resp = analyze_handler(
            State(st.clone()),
            HeaderMap::new(),
            Bytes::from(fixture("trial_strong.csv")),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let v = body_json(resp).await;
        assert_eq!(v["report"]["status"], "completed");
        assert_eq!(v["report"]["narrative"]["category"], "strong_positive");
        assert_eq!(v["charts"]["entries"].as_array().unwrap().len(), 11);

        assert_eq!(st.total_requests.load(Ordering::Relaxed), 1);
        assert_eq!(st.inflight.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_analyze_json_body_with_config() {
        let body = serde_json::json!({
            "csv": fixture("trial_age_imbalance.csv"),
            "config": { "alpha": 0.01 },
        });
        let resp = analyze_handler(
            State(state()),
            json_headers(),
            Bytes::from(serde_json::to_vec(&body).unwrap()),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let v = body_json(resp).await;
        assert_eq!(v["report"]["equivalence"]["failing"], serde_json::json!(["Age"]));
        assert_eq!(v["report"]["correction"]["formula"], " + age");
    }

    #[tokio::test]
    async fn test_failed_validation_is_unprocessable() {
        let resp = analyze_handler(
            State(state()),
            HeaderMap::new(),
            Bytes::from(fixture("trial_unknown_numeric.csv")),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let v = body_json(resp).await;
        assert_eq!(v["report"]["status"], "failed");
        assert_eq!(v["report"]["error"]["kind"], "empty_numeric_data");
        assert!(v.get("charts").is_none());
    }

    #[tokio::test]
    async fn test_invalid_config_is_bad_request() {
        let body = serde_json::json!({ "csv": "age\n1\n", "config": { "alpha": 0.0 } });
        let err = analyze_handler(
            State(state()),
            json_headers(),
            Bytes::from(serde_json::to_vec(&body).unwrap()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("alpha"), "{}", err.message);
    }

    #[tokio::test]
    async fn test_timeout_maps_to_503() {
        let err = run_blocking(Duration::from_millis(10), || {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        })
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_template_and_health() {
        let resp = template_handler().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("age,gestational_week,"), "{text}");
        assert_eq!(text.lines().count(), 1);

        let Json(h) = health_handler(State(state())).await;
        assert_eq!(h.status, "ok");
        assert_eq!(h.total_requests, 0);
        assert_eq!(h.analysis_timeout_s, 30.0);
    }
}
