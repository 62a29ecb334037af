//! Settings store: the invoice sequence counter and the tax rate

use chrono::{Datelike, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::types::format_invoice_number;

pub const INVOICE_SEQUENCE_KEY: &str = "invoice_sequence";
pub const TAX_RATE_KEY: &str = "tax_rate";

/// Key/value settings service
#[derive(Clone)]
pub struct SettingsService {
    db: PgPool,
}

impl SettingsService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Issue the next invoice number.
    ///
    /// The counter is bumped with a single atomic upsert, never a
    /// read-then-write pair, so concurrent sales can never share a number.
    /// Callers invoke this outside their transaction scope: an aborted sale
    /// leaves a gap in the sequence rather than a reused number.
    pub async fn next_invoice_number(&self) -> AppResult<String> {
        let value = sqlx::query_scalar::<_, Decimal>(
            r#"
            INSERT INTO settings (key, value) VALUES ($1, 1)
            ON CONFLICT (key)
            DO UPDATE SET value = settings.value + 1, updated_at = NOW()
            RETURNING value
            "#,
        )
        .bind(INVOICE_SEQUENCE_KEY)
        .fetch_one(&self.db)
        .await?;

        let sequence = value
            .to_i64()
            .ok_or_else(|| AppError::Internal("Invoice sequence out of range".to_string()))?;

        Ok(format_invoice_number(Utc::now().year(), sequence))
    }

    /// Current tax rate as a percentage; 0 when unset
    pub async fn tax_rate(&self) -> AppResult<Decimal> {
        let rate = sqlx::query_scalar::<_, Decimal>("SELECT value FROM settings WHERE key = $1")
            .bind(TAX_RATE_KEY)
            .fetch_optional(&self.db)
            .await?;

        Ok(rate.unwrap_or(Decimal::ZERO))
    }

    pub async fn set_tax_rate(&self, rate: Decimal) -> AppResult<Decimal> {
        if rate < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "rate".to_string(),
                message: "Tax rate cannot be negative".to_string(),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES ($1, $2)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(TAX_RATE_KEY)
        .bind(rate)
        .execute(&self.db)
        .await?;

        Ok(rate)
    }
}
