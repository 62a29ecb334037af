//! HTTP handlers for sale endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sale::{Sale, SaleFilter, SaleService, SaleWithItems};
use crate::AppState;
use shared::models::CreateSaleCommand;

/// Query parameters for the sale listing
#[derive(Debug, Deserialize)]
pub struct SaleListParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Create a sale, deducting inventory
pub async fn create_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(cmd): Json<CreateSaleCommand>,
) -> AppResult<Json<SaleWithItems>> {
    let service = SaleService::new(state.db, state.report_cache);
    let sale = service.create_sale(current_user.0.user_id, cmd).await?;
    Ok(Json(sale))
}

/// List sales within an optional date range
pub async fn list_sales(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(params): Query<SaleListParams>,
) -> AppResult<Json<Vec<Sale>>> {
    let service = SaleService::new(state.db, state.report_cache);
    let sales = service
        .list_sales(SaleFilter {
            from: params.from,
            to: params.to,
        })
        .await?;
    Ok(Json(sales))
}

/// Get a single sale with its line items
pub async fn get_sale(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleWithItems>> {
    let service = SaleService::new(state.db, state.report_cache);
    let sale = service.get_sale(sale_id).await?;
    Ok(Json(sale))
}

/// Delete a sale and restore its inventory
pub async fn delete_sale(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let service = SaleService::new(state.db, state.report_cache);
    service.delete_sale(sale_id).await?;
    Ok(Json(json!({
        "message": "Sale deleted successfully. Inventory has been restored."
    })))
}
