//! JSON HTTP API for dashboard front-ends.
//!
//! The dataset is loaded once before the listener binds; a load failure
//! aborts startup. Every request then filters and aggregates the shared,
//! read-only dataset from scratch.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (version, record count) |
//! | `GET`  | `/api/summary` | Count, averages, sentiment label |
//! | `GET`  | `/api/trend` | Comments per day |
//! | `GET`  | `/api/sentiment` | Comments per sentiment category |
//! | `GET`  | `/api/correlation` | Pearson matrix over numeric columns |
//! | `GET`  | `/api/records` | Filtered, searchable comment table |
//! | `GET`  | `/api/dashboard?view=...` | Any of the above, selected by query |
//!
//! # Query parameters
//!
//! `sentiment` (comma separated; absent = all, empty = none), `since`,
//! `until` (`YYYY-MM-DD`, inclusive), `q` (keyword, records only), `limit`
//! (records only), `zero_fill` (trend only), `view` (dashboard only).
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "invalid filter: ..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `internal` (500).

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::DashboardError;
use crate::loader::DatasetCache;
use crate::models::{parse_filter_date, parse_sentiments, Dataset, FilterCriteria, Sentiment};
use crate::views::{render, ViewKind, ViewPayload, ViewRequest};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    dataset: Arc<Dataset>,
}

impl AppState {
    pub fn new(config: Arc<Config>, dataset: Arc<Dataset>) -> Self {
        Self { config, dataset }
    }
}

/// Loads the dataset through `cache` and serves the API on `[server].bind`
/// until the process is terminated.
pub async fn run_server(cache: &DatasetCache, config: &Config) -> anyhow::Result<()> {
    let dataset = cache.get_or_load(config).await?;
    serve(Arc::new(config.clone()), dataset).await
}

/// Serves an already-loaded dataset.
pub async fn serve(config: Arc<Config>, dataset: Arc<Dataset>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(AppState::new(config, dataset));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "dashboard API listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/summary", get(handle_summary))
        .route("/api/trend", get(handle_trend))
        .route("/api/sentiment", get(handle_sentiment))
        .route("/api/correlation", get(handle_correlation))
        .route("/api/records", get(handle_records))
        .route("/api/dashboard", get(handle_dashboard))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        if err.is_client_error() {
            bad_request(err.to_string())
        } else {
            internal(err.to_string())
        }
    }
}

// ============ Query parsing ============

/// Filter and view parameters shared by all `/api` routes.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub sentiment: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub q: Option<String>,
    pub limit: Option<String>,
    pub zero_fill: Option<String>,
    pub view: Option<String>,
}

impl ViewQuery {
    fn to_request(&self, config: &Config) -> Result<ViewRequest, DashboardError> {
        let sentiments = match &self.sentiment {
            Some(list) => parse_sentiments(&[list])?,
            None => Sentiment::ALL.to_vec(),
        };
        let parse_bound = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(parse_filter_date)
                .transpose()
        };
        let criteria = FilterCriteria::new(
            sentiments,
            parse_bound(&self.since)?,
            parse_bound(&self.until)?,
        )?;

        let mut request = ViewRequest::from_config(config);
        request.criteria = criteria;
        request.keyword = self.q.clone();
        request.limit = nonblank(&self.limit)
            .map(|v| {
                v.parse::<usize>().map_err(|_| {
                    DashboardError::InvalidFilter(format!("limit '{}' is not a non-negative integer", v))
                })
            })
            .transpose()?;
        if let Some(z) = nonblank(&self.zero_fill) {
            request.zero_fill = parse_bool(z).ok_or_else(|| {
                DashboardError::InvalidFilter(format!("zero_fill '{}' is not true or false", z))
            })?;
        }
        Ok(request)
    }
}

fn nonblank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn respond(
    state: &AppState,
    kind: ViewKind,
    query: &ViewQuery,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = query.to_request(&state.config)?;
    debug!(view = %kind, ?request, "rendering view");
    let payload: ViewPayload<'_> = render(&state.dataset, kind, &request);
    serde_json::to_value(&payload)
        .map(Json)
        .map_err(|e| internal(e.to_string()))
}

// ============ Handlers ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    records: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        records: state.dataset.len(),
    })
}

async fn handle_summary(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    respond(&state, ViewKind::Summary, &query)
}

async fn handle_trend(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    respond(&state, ViewKind::Trend, &query)
}

async fn handle_sentiment(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    respond(&state, ViewKind::Sentiment, &query)
}

async fn handle_correlation(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    respond(&state, ViewKind::Correlation, &query)
}

async fn handle_records(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    respond(&state, ViewKind::Data, &query)
}

/// Query-parameter routing: `?view=trend` selects the view, defaulting
/// to the summary.
async fn handle_dashboard(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let kind = match query.view.as_deref() {
        Some(v) => v.parse::<ViewKind>().map_err(bad_request)?,
        None => ViewKind::Summary,
    };
    respond(&state, kind, &query)
}
