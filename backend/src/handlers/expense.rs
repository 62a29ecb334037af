//! HTTP handlers for expense endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::expense::{Expense, ExpenseFilter, ExpenseService};
use crate::AppState;
use shared::models::CreateExpenseCommand;

/// Query parameters for the expense listing
#[derive(Debug, Deserialize)]
pub struct ExpenseListParams {
    pub category: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Record an expense
pub async fn create_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(cmd): Json<CreateExpenseCommand>,
) -> AppResult<Json<Expense>> {
    let service = ExpenseService::new(state.db, state.report_cache);
    let expense = service.create_expense(current_user.0.user_id, cmd).await?;
    Ok(Json(expense))
}

/// List expenses with optional category and date filters
pub async fn list_expenses(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(params): Query<ExpenseListParams>,
) -> AppResult<Json<Vec<Expense>>> {
    let service = ExpenseService::new(state.db, state.report_cache);
    let expenses = service
        .list_expenses(ExpenseFilter {
            category: params.category,
            from: params.from,
            to: params.to,
        })
        .await?;
    Ok(Json(expenses))
}

/// Delete an expense
pub async fn delete_expense(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(expense_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ExpenseService::new(state.db, state.report_cache);
    service.delete_expense(expense_id).await?;
    Ok(Json(()))
}
