use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::{default_overlays, summarize, Overlay};
use crate::constants::POPULAR_STOCKS;
use crate::error::AppError;
use crate::models::{OhlcvSeries, SummaryStats};
use crate::server::AppState;
use crate::services::fetch_series;
use crate::utils::{normalize_symbol, parse_date, resolve_date_range};

/// Request body for POST /api/analyze
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub symbol: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Response body for POST /api/analyze: the summary plus everything an
/// external chart renderer needs (canonical bars and aligned overlays)
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub summary: SummaryStats,
    pub series: OhlcvSeries,
    pub overlays: Vec<Overlay>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// POST /api/analyze - fetch, normalize, and summarize one symbol
///
/// Example body: {"symbol": "VNM", "start_date": "2024-01-01"}
pub async fn analyze_handler(
    State(app_state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    match analyze(&app_state, request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(e),
    }
}

async fn analyze(app_state: &AppState, request: AnalyzeRequest) -> Result<AnalyzeResponse, AppError> {
    let symbol = normalize_symbol(&request.symbol)?;
    let start = request.start_date.as_deref().map(parse_date).transpose()?;
    let end = request.end_date.as_deref().map(parse_date).transpose()?;
    let (start, end) = resolve_date_range(start, end)?;

    info!("Analyzing {} from {} to {}", symbol, start, end);

    let series = fetch_series(app_state.source.as_ref(), &symbol, start, end).await?;
    let summary = summarize(&series);
    let overlays = default_overlays(&series);

    Ok(AnalyzeResponse {
        success: true,
        summary,
        series,
        overlays,
    })
}

fn error_response(err: AppError) -> Response {
    let status = match &err {
        AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AppError::NoData { .. } => StatusCode::NOT_FOUND,
        AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    warn!("Request failed: {}", err);

    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// One entry of the GET /api/stocks listing
#[derive(Debug, Serialize)]
pub struct StockListing {
    pub symbol: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
}

/// GET /api/stocks - frequently requested Vietnamese tickers
pub async fn stocks_handler() -> Json<Vec<StockListing>> {
    let stocks = POPULAR_STOCKS
        .iter()
        .map(|&(symbol, name, sector)| StockListing {
            symbol,
            name,
            sector,
        })
        .collect();
    Json(stocks)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// GET /health - liveness probe
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "vnquote",
        version: env!("CARGO_PKG_VERSION"),
    })
}
