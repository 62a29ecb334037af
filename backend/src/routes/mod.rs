//! Route definitions for the Shop ERP Platform

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - product catalog
        .nest("/products", product_routes())
        // Protected routes - sales
        .nest("/sales", sale_routes())
        // Protected routes - purchases
        .nest("/purchases", purchase_routes())
        // Protected routes - expenses
        .nest("/expenses", expense_routes())
        // Protected routes - reporting
        .nest("/reports", report_routes())
        // Protected routes - settings
        .nest("/settings", settings_routes())
        // Protected routes - LLM assistant
        .nest("/assistant", assistant_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Product catalog routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:product_id/transactions", get(handlers::get_stock_ledger))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sale routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route(
            "/:sale_id",
            get(handlers::get_sale).delete(handlers::delete_sale),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase routes (protected)
fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchases).post(handlers::create_purchase),
        )
        .route(
            "/:purchase_id",
            get(handlers::get_purchase).delete(handlers::delete_purchase),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Expense routes (protected)
fn expense_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/:expense_id", delete(handlers::delete_expense))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/top-products", get(handlers::get_top_products))
        .route("/low-stock", get(handlers::get_low_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Settings routes (protected)
fn settings_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tax-rate",
            get(handlers::get_tax_rate).put(handlers::set_tax_rate),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// LLM assistant routes (protected)
fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(handlers::assistant_query))
        .route("/insights", get(handlers::assistant_insights))
        .route_layer(middleware::from_fn(auth_middleware))
}
