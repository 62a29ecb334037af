//! Purchase service: supplier restocks and their reversal
//!
//! Mirrors the sale service on the stock-in side: one transaction per
//! operation, one ledger entry per stock change.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ReportCache;
use shared::models::CreatePurchaseCommand;
use shared::types::StockMovementKind;
use shared::validation::validate_purchase_command;

/// Purchase service
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
    cache: Arc<ReportCache>,
}

/// A recorded supplier purchase
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub supplier: String,
    pub invoice_ref: Option<String>,
    pub total_amount: Decimal,
    pub date: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One restocked purchase line
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseItem {
    pub id: i64,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub qty: i64,
    pub cost_price: Decimal,
}

/// Purchase with its line items
#[derive(Debug, Serialize)]
pub struct PurchaseWithItems {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub items: Vec<PurchaseItem>,
}

/// Date range filter for purchase listings
#[derive(Debug, Default)]
pub struct PurchaseFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct ProductRef {
    id: Uuid,
    name: String,
    current_stock: i64,
}

impl PurchaseService {
    pub fn new(db: PgPool, cache: Arc<ReportCache>) -> Self {
        Self { db, cache }
    }

    /// Record a purchase, adding stock and updating each product's cost
    /// price (last-cost accounting; the final item wins when one product
    /// appears on several lines).
    pub async fn create_purchase(
        &self,
        user_id: Uuid,
        cmd: CreatePurchaseCommand,
    ) -> AppResult<PurchaseWithItems> {
        validate_purchase_command(&cmd)?;

        let total_amount: Decimal = cmd
            .items
            .iter()
            .map(|item| item.cost_price * Decimal::from(item.qty))
            .sum();
        let purchase_date = Utc::now();

        let mut tx = self.db.begin().await?;

        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases (supplier, invoice_ref, total_amount, date, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, supplier, invoice_ref, total_amount, date, created_by, created_at
            "#,
        )
        .bind(cmd.supplier.trim())
        .bind(&cmd.invoice_ref)
        .bind(total_amount)
        .bind(purchase_date)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(cmd.items.len());
        for item in &cmd.items {
            // The increment doubles as the existence check
            let updated = sqlx::query_scalar::<_, Uuid>(
                r#"
                UPDATE products
                SET current_stock = current_stock + $1, cost_price = $2, updated_at = NOW()
                WHERE id = $3
                RETURNING id
                "#,
            )
            .bind(item.qty)
            .bind(item.cost_price)
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            if updated.is_none() {
                return Err(AppError::NotFound(format!("Product {}", item.product_id)));
            }

            sqlx::query(
                r#"
                INSERT INTO stock_transactions (product_id, type, qty, unit_price, purchase_id, date)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.product_id)
            .bind(StockMovementKind::Purchase.as_str())
            .bind(item.qty)
            .bind(item.cost_price)
            .bind(purchase.id)
            .bind(purchase_date)
            .execute(&mut *tx)
            .await?;

            let row = sqlx::query_as::<_, PurchaseItem>(
                r#"
                INSERT INTO purchase_items (purchase_id, product_id, qty, cost_price)
                VALUES ($1, $2, $3, $4)
                RETURNING id, purchase_id, product_id, qty, cost_price
                "#,
            )
            .bind(purchase.id)
            .bind(item.product_id)
            .bind(item.qty)
            .bind(item.cost_price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        tx.commit().await?;

        self.cache.clear();

        tracing::info!(supplier = %purchase.supplier, total = %purchase.total_amount, "Purchase recorded");

        Ok(PurchaseWithItems { purchase, items })
    }

    /// Delete a purchase, removing the stock it added.
    ///
    /// Fails with `InsufficientStock` when part of the purchased quantity has
    /// already been sold through and cannot be given back.
    pub async fn delete_purchase(&self, purchase_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, supplier, invoice_ref, total_amount, date, created_by, created_at
            FROM purchases
            WHERE id = $1
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        let items = sqlx::query_as::<_, PurchaseItem>(
            r#"
            SELECT id, purchase_id, product_id, qty, cost_price
            FROM purchase_items
            WHERE purchase_id = $1
            ORDER BY id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&mut *tx)
        .await?;

        let reference = purchase
            .invoice_ref
            .clone()
            .unwrap_or_else(|| purchase.id.to_string());

        for item in &items {
            let product = sqlx::query_as::<_, ProductRef>(
                "SELECT id, name, current_stock FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(product) = product else {
                continue;
            };

            if product.current_stock < item.qty {
                return Err(AppError::InsufficientStock {
                    product: product.name,
                    available: product.current_stock,
                });
            }

            sqlx::query(
                "UPDATE products SET current_stock = current_stock - $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(item.qty)
            .bind(product.id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO stock_transactions (product_id, type, qty, unit_price, note, date)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(product.id)
            .bind(StockMovementKind::Adjustment.as_str())
            .bind(-item.qty)
            .bind(item.cost_price)
            .bind(format!("Purchase {} deleted", reference))
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        // Detach the original entries so nothing references the deleted purchase
        sqlx::query("UPDATE stock_transactions SET purchase_id = NULL WHERE purchase_id = $1")
            .bind(purchase_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM purchases WHERE id = $1")
            .bind(purchase_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.cache.clear();

        tracing::info!(purchase = %reference, "Purchase deleted, inventory adjusted");

        Ok(())
    }

    pub async fn get_purchase(&self, purchase_id: Uuid) -> AppResult<PurchaseWithItems> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, supplier, invoice_ref, total_amount, date, created_by, created_at
            FROM purchases
            WHERE id = $1
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        let items = sqlx::query_as::<_, PurchaseItem>(
            r#"
            SELECT id, purchase_id, product_id, qty, cost_price
            FROM purchase_items
            WHERE purchase_id = $1
            ORDER BY id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.db)
        .await?;

        Ok(PurchaseWithItems { purchase, items })
    }

    pub async fn list_purchases(&self, filter: PurchaseFilter) -> AppResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, supplier, invoice_ref, total_amount, date, created_by, created_at
            FROM purchases
            WHERE ($1::TIMESTAMPTZ IS NULL OR date >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR date <= $2)
            ORDER BY date DESC
            "#,
        )
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.db)
        .await?;

        Ok(purchases)
    }
}
