//! HTTP handlers for reporting endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::report::{
    LowStockProduct, ReportService, SummaryReport, TopProduct, DEFAULT_LOW_STOCK_LIMIT,
};
use crate::AppState;

/// Query parameters for the summary report
#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Query parameters for the top-products report
#[derive(Debug, Deserialize)]
pub struct TopProductsParams {
    pub period_days: Option<i64>,
    pub limit: Option<i64>,
}

/// Query parameters for the low-stock report
#[derive(Debug, Deserialize)]
pub struct LowStockParams {
    pub limit: Option<i64>,
}

/// Revenue, COGS, profit and expenses for a date range
pub async fn get_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(params): Query<SummaryParams>,
) -> AppResult<Json<SummaryReport>> {
    let service = ReportService::new(state.db, state.report_cache);
    let summary = service.summary(params.from, params.to).await?;
    Ok(Json(summary))
}

/// Top-selling products over the trailing period
pub async fn get_top_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(params): Query<TopProductsParams>,
) -> AppResult<Json<Vec<TopProduct>>> {
    let service = ReportService::new(state.db, state.report_cache);
    let products = service
        .top_products(params.period_days.unwrap_or(7), params.limit.unwrap_or(10))
        .await?;
    Ok(Json(products))
}

/// Products below their reorder threshold
pub async fn get_low_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(params): Query<LowStockParams>,
) -> AppResult<Json<Vec<LowStockProduct>>> {
    let service = ReportService::new(state.db, state.report_cache);
    let products = service
        .low_stock(params.limit.unwrap_or(DEFAULT_LOW_STOCK_LIMIT))
        .await?;
    Ok(Json(products))
}
