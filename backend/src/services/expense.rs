//! Expense service
//!
//! Operating expenses feed the summary report, so mutations here clear the
//! report cache just like the stock operations do.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ReportCache;
use shared::models::CreateExpenseCommand;
use shared::validation::validate_expense_command;

/// Expense service
#[derive(Clone)]
pub struct ExpenseService {
    db: PgPool,
    cache: Arc<ReportCache>,
}

/// A recorded operating expense
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub category: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub date: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Listing filters for expenses
#[derive(Debug, Default)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ExpenseService {
    pub fn new(db: PgPool, cache: Arc<ReportCache>) -> Self {
        Self { db, cache }
    }

    pub async fn create_expense(
        &self,
        user_id: Uuid,
        cmd: CreateExpenseCommand,
    ) -> AppResult<Expense> {
        validate_expense_command(&cmd)?;

        let date = cmd.date.unwrap_or_else(Utc::now);

        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (category, amount, note, date, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, category, amount, note, date, created_by, created_at
            "#,
        )
        .bind(cmd.category.trim())
        .bind(cmd.amount)
        .bind(&cmd.note)
        .bind(date)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        self.cache.clear();

        Ok(expense)
    }

    pub async fn list_expenses(&self, filter: ExpenseFilter) -> AppResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, category, amount, note, date, created_by, created_at
            FROM expenses
            WHERE ($1::TEXT IS NULL OR category = $1)
              AND ($2::TIMESTAMPTZ IS NULL OR date >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR date <= $3)
            ORDER BY date DESC
            "#,
        )
        .bind(&filter.category)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.db)
        .await?;

        Ok(expenses)
    }

    pub async fn delete_expense(&self, expense_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(expense_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Expense".to_string()));
        }

        self.cache.clear();

        Ok(())
    }
}
