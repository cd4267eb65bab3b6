use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use http::header;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::RangeTag;
use crate::services::market_service;
use crate::services::market_snapshot::SnapshotView;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fetch", post(fetch_chart))
        .route("/stats", get(get_stats))
        .route("/target", put(set_target))
        .route("/chart", get(get_chart))
        .route("/reset", post(reset))
}

#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    pub ticker: String,
    pub range: RangeTag,
}

#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub target_price: Option<f64>,
}

pub async fn fetch_chart(
    State(state): State<AppState>,
    Json(req): Json<FetchRequest>,
) -> Result<Json<SnapshotView>, AppError> {
    info!("POST /market/fetch - {} over {}", req.ticker, req.range.label());
    if req.ticker.trim().is_empty() {
        return Err(AppError::Validation("ticker must not be blank".to_string()));
    }

    let view = market_service::fetch_and_compute(
        state.price_provider.as_ref(),
        state.chart_renderer.as_ref(),
        &state.market,
        req.ticker.trim(),
        req.range,
    )
    .await
    .map_err(|e| {
        match &e {
            AppError::RateLimited => warn!("Rate limited fetching {}", req.ticker),
            _ => error!("Failed to fetch {}: {}", req.ticker, e),
        }
        e
    })?;

    Ok(Json(view))
}

pub async fn get_stats(State(state): State<AppState>) -> Json<SnapshotView> {
    Json(state.market.view())
}

pub async fn set_target(
    State(state): State<AppState>,
    Json(req): Json<TargetRequest>,
) -> Json<SnapshotView> {
    info!("PUT /market/target - {:?}", req.target_price);
    state.market.set_target(req.target_price.filter(|t| t.is_finite()));
    Json(state.market.view())
}

pub async fn get_chart(State(state): State<AppState>) -> Result<Response, AppError> {
    let image = state
        .market
        .chart_image()
        .ok_or_else(|| AppError::NotFound("no chart captured".to_string()))?;
    Ok(([(header::CONTENT_TYPE, "image/png")], image).into_response())
}

pub async fn reset(State(state): State<AppState>) -> Json<SnapshotView> {
    info!("POST /market/reset");
    state.market.reset();
    Json(state.market.view())
}
