// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/`. CORS is configured permissively for
// development; tighten `allowed_origins` in production.
//
// Error mapping:
//   - input errors (missing/identical tickers) and market-data failures
//     (unknown ticker, insufficient overlap) -> 400 with a readable message
//   - unknown ticker on the validate endpoint -> 404
//   - anything unexpected in the pipeline -> 500, logged with the full error
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::market_data::DailyHistory;
use crate::series::round_dp;
use crate::signals::conviction::combine;
use crate::types::Lookback;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/validate/:ticker", get(validate))
        .route("/api/search", get(search))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Error type
// =============================================================================

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
    analyses_run: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.started_at.elapsed().as_secs(),
        analyses_run: state.analyses_run(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Analyze
// =============================================================================

#[derive(Deserialize)]
struct AnalyzeRequest {
    ticker_a: String,
    ticker_b: String,
    #[serde(default)]
    period: Option<String>,
}

/// Chart payload for one leg of the pair (full unaligned history).
#[derive(Serialize)]
struct ChartSeries {
    symbol: String,
    name: String,
    dates: Vec<String>,
    prices: Vec<f64>,
}

impl ChartSeries {
    fn from_history(history: DailyHistory) -> Self {
        Self {
            symbol: history.symbol,
            name: history.name,
            dates: history
                .dates
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect(),
            prices: history.closes.iter().map(|&p| round_dp(p, 2)).collect(),
        }
    }

    fn placeholder(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            dates: Vec::new(),
            prices: Vec::new(),
        }
    }
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ticker_a = request.ticker_a.trim().to_uppercase();
    let ticker_b = request.ticker_b.trim().to_uppercase();

    if ticker_a.is_empty() || ticker_b.is_empty() {
        return Err(ApiError::bad_request("Both tickers are required."));
    }
    if ticker_a == ticker_b {
        return Err(ApiError::bad_request("Tickers must be different."));
    }

    let period = request
        .period
        .as_deref()
        .and_then(Lookback::parse)
        .unwrap_or_default();

    let request_id = Uuid::new_v4();
    info!(%request_id, %ticker_a, %ticker_b, %period, "analysis request");

    // The three network fetches are independent; run them concurrently.
    let (pair, chart_a, chart_b) = tokio::join!(
        state.market.fetch_pair(&ticker_a, &ticker_b, period),
        state.market.history(&ticker_a, period.as_range()),
        state.market.history(&ticker_b, period.as_range()),
    );

    let pair = pair.map_err(|e| ApiError::bad_request(e.to_string()))?;

    let chart_a = chart_a
        .map(ChartSeries::from_history)
        .unwrap_or_else(|_| ChartSeries::placeholder(&ticker_a));
    let chart_b = chart_b
        .map(ChartSeries::from_history)
        .unwrap_or_else(|_| ChartSeries::placeholder(&ticker_b));

    // CPU-bound statistics off the async worker threads.
    let config = state.runtime_config.read().clone();
    let bundle = tokio::task::spawn_blocking(move || {
        crate::analysis::run_full_analysis(&config, &pair)
    })
    .await
    .map_err(|e| {
        error!(%request_id, error = %e, "analysis task panicked");
        ApiError::internal(format!("Analysis failed: {e}"))
    })?
    .map_err(|e| {
        error!(%request_id, error = %e, "analysis pipeline failed");
        ApiError::internal(format!("Analysis failed: {e}"))
    })?;

    // Advisory judgment is issued only after statistics and technicals are
    // available (its prompt embeds both); its failures degrade internally.
    let advisory = state
        .advisory
        .recommend(
            &ticker_a,
            &ticker_b,
            &bundle.statistics,
            &bundle.technicals.confirmation,
            &bundle.signal,
        )
        .await;

    let combined = combine(
        bundle.signal.direction,
        &bundle.statistics,
        &bundle.technicals.confirmation,
        &advisory,
    );

    let total = state.record_analysis();
    info!(
        %request_id,
        direction = %combined.direction,
        conviction = combined.conviction,
        analyses_run = total,
        "analysis complete"
    );

    Ok(Json(json!({
        "ticker_a": chart_a,
        "ticker_b": chart_b,
        "statistics": bundle.statistics,
        "ratio": bundle.ratio,
        "zscore": bundle.zscore,
        "returns": bundle.returns,
        "correlation_rolling": bundle.correlation_rolling,
        "technicals": bundle.technicals,
        "individual_rsi": bundle.individual_rsi,
        "signal": bundle.signal,
        "ai_recommendation": advisory,
        "combined": combined,
    })))
}

// =============================================================================
// Validate
// =============================================================================

async fn validate(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let symbol = ticker.trim().to_uppercase();
    match state.market.validate(&symbol).await {
        Ok(info) => Ok(Json(serde_json::to_value(info).unwrap_or_default())),
        Err(_) => Err(ApiError::not_found(format!("Ticker '{symbol}' not found."))),
    }
}

// =============================================================================
// Search
// =============================================================================

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<serde_json::Value> {
    let query = params.q.trim();
    if query.is_empty() {
        return Json(json!({ "results": [] }));
    }

    let results = state.market.search(query).await.unwrap_or_default();
    Json(json!({ "results": results }))
}
