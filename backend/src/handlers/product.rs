//! HTTP handlers for product catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::product::{Product, ProductFilter, ProductService, StockTransaction};
use crate::AppState;
use shared::models::{CreateProductCommand, UpdateProductCommand};

/// Query parameters for the product listing
#[derive(Debug, Deserialize)]
pub struct ProductListParams {
    pub category: Option<String>,
    #[serde(default)]
    pub low_stock: bool,
}

/// List products, optionally filtered by category or low stock
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(params): Query<ProductListParams>,
) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    let products = service
        .list_products(ProductFilter {
            category: params.category,
            low_stock: params.low_stock,
        })
        .await?;
    Ok(Json(products))
}

/// Get a single product
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(cmd): Json<CreateProductCommand>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.create_product(current_user.0.user_id, cmd).await?;
    Ok(Json(product))
}

/// Update a product's catalog fields
pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(cmd): Json<UpdateProductCommand>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service
        .update_product(current_user.0.user_id, product_id, cmd)
        .await?;
    Ok(Json(product))
}

/// Delete a product (blocked while referenced by sales or purchases)
pub async fn delete_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ProductService::new(state.db);
    service.delete_product(product_id).await?;
    Ok(Json(()))
}

/// Get the product's stock ledger
pub async fn get_stock_ledger(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockTransaction>>> {
    let service = ProductService::new(state.db);
    let transactions = service.stock_ledger(product_id).await?;
    Ok(Json(transactions))
}
