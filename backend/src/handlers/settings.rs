//! HTTP handlers for settings endpoints

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::SettingsService;
use crate::AppState;

/// Tax rate payload
#[derive(Debug, Serialize, Deserialize)]
pub struct TaxRateBody {
    pub rate: Decimal,
}

/// Get the configured tax rate (percentage)
pub async fn get_tax_rate(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<TaxRateBody>> {
    let service = SettingsService::new(state.db);
    let rate = service.tax_rate().await?;
    Ok(Json(TaxRateBody { rate }))
}

/// Set the tax rate (percentage)
pub async fn set_tax_rate(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(body): Json<TaxRateBody>,
) -> AppResult<Json<TaxRateBody>> {
    let service = SettingsService::new(state.db);
    let rate = service.set_tax_rate(body.rate).await?;
    Ok(Json(TaxRateBody { rate }))
}
