//! HTTP handlers for purchase endpoints

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
use crate::services::purchase::{Purchase, PurchaseFilter, PurchaseService, PurchaseWithItems};
use crate::AppState;
use shared::models::CreatePurchaseCommand;

/// Query parameters for the purchase listing
#[derive(Debug, Deserialize)]
pub struct PurchaseListParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Record a purchase, adding inventory
pub async fn create_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(cmd): Json<CreatePurchaseCommand>,
) -> AppResult<Json<PurchaseWithItems>> {
    let service = PurchaseService::new(state.db, state.report_cache);
    let purchase = service.create_purchase(current_user.0.user_id, cmd).await?;
    Ok(Json(purchase))
}

/// List purchases within an optional date range
pub async fn list_purchases(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(params): Query<PurchaseListParams>,
) -> AppResult<Json<Vec<Purchase>>> {
    let service = PurchaseService::new(state.db, state.report_cache);
    let purchases = service
        .list_purchases(PurchaseFilter {
            from: params.from,
            to: params.to,
        })
        .await?;
    Ok(Json(purchases))
}

/// Get a single purchase with its line items
pub async fn get_purchase(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseWithItems>> {
    let service = PurchaseService::new(state.db, state.report_cache);
    let purchase = service.get_purchase(purchase_id).await?;
    Ok(Json(purchase))
}

/// Delete a purchase and remove the stock it added
pub async fn delete_purchase(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let service = PurchaseService::new(state.db, state.report_cache);
    service.delete_purchase(purchase_id).await?;
    Ok(Json(json!({
        "message": "Purchase deleted successfully. Inventory has been adjusted."
    })))
}
