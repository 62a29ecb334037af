//! Sale service: sale creation and deletion with inventory deduction
//!
//! Both operations run as a single database transaction. Every stock change
//! is paired with exactly one stock_transactions ledger entry, so for each
//! product `current_stock` always equals the sum of its ledger quantities.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::{ReportCache, SettingsService};
use shared::models::CreateSaleCommand;
use shared::types::{compute_sale_totals, StockMovementKind};
use shared::validation::validate_sale_command;

/// Sale service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
    cache: Arc<ReportCache>,
    settings: SettingsService,
}

/// A completed sale
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub subtotal: Decimal,
    pub taxes: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub payment_method: String,
    pub date: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One sale line with point-in-time price snapshots
///
/// `cost_price` is the product's cost at sale time so profit reports stay
/// accurate when the catalog price changes later.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub qty: i64,
    pub sell_price: Decimal,
    pub cost_price: Decimal,
}

/// Sale with its line items
#[derive(Debug, Serialize)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Date range filter for sale listings
#[derive(Debug, Default)]
pub struct SaleFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Product fields needed while building a sale line
#[derive(Debug, FromRow)]
struct ProductLine {
    id: Uuid,
    name: String,
    sell_price: Decimal,
    cost_price: Decimal,
    current_stock: i64,
}

impl SaleService {
    pub fn new(db: PgPool, cache: Arc<ReportCache>) -> Self {
        let settings = SettingsService::new(db.clone());
        Self {
            db,
            cache,
            settings,
        }
    }

    /// Create a sale, deducting stock for every line atomically.
    ///
    /// Fails with `NotFound` for an unknown product and `InsufficientStock`
    /// when a line asks for more than is on hand; either failure rolls the
    /// whole operation back.
    pub async fn create_sale(
        &self,
        user_id: Uuid,
        cmd: CreateSaleCommand,
    ) -> AppResult<SaleWithItems> {
        validate_sale_command(&cmd)?;

        // Issued outside the transaction: the counter never rolls back, so an
        // aborted sale leaves a gap in the sequence instead of a duplicate.
        let invoice_number = self.settings.next_invoice_number().await?;
        let tax_rate = self.settings.tax_rate().await?;
        let sale_date = Utc::now();

        let mut tx = self.db.begin().await?;

        let mut subtotal = Decimal::ZERO;
        let mut lines = Vec::with_capacity(cmd.items.len());
        let mut movement_ids: Vec<Uuid> = Vec::with_capacity(cmd.items.len());

        for item in &cmd.items {
            // FOR UPDATE serializes concurrent operations on the same product
            let product = sqlx::query_as::<_, ProductLine>(
                r#"
                SELECT id, name, sell_price, cost_price, current_stock
                FROM products
                WHERE id = $1
                FOR UPDATE
                "#,
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {}", item.product_id)))?;

            if product.current_stock < item.qty {
                return Err(AppError::InsufficientStock {
                    product: product.name,
                    available: product.current_stock,
                });
            }

            let sell_price = item.sell_price.unwrap_or(product.sell_price);
            subtotal += sell_price * Decimal::from(item.qty);

            sqlx::query(
                "UPDATE products SET current_stock = current_stock - $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(item.qty)
            .bind(product.id)
            .execute(&mut *tx)
            .await?;

            let movement_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO stock_transactions (product_id, type, qty, unit_price, date)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(product.id)
            .bind(StockMovementKind::Sale.as_str())
            .bind(-item.qty)
            .bind(sell_price)
            .bind(sale_date)
            .fetch_one(&mut *tx)
            .await?;
            movement_ids.push(movement_id);

            lines.push((product.id, product.name, item.qty, sell_price, product.cost_price));
        }

        if cmd.discount > subtotal {
            return Err(AppError::Validation {
                field: "discount".to_string(),
                message: "Discount cannot exceed the subtotal".to_string(),
            });
        }

        let totals = compute_sale_totals(subtotal, cmd.discount, tax_rate);
        let customer = cmd.customer.unwrap_or_default();

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (
                invoice_number, customer_name, customer_phone,
                subtotal, taxes, discount, total,
                payment_method, date, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, invoice_number, customer_name, customer_phone,
                      subtotal, taxes, discount, total,
                      payment_method, date, created_by, created_at
            "#,
        )
        .bind(&invoice_number)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(totals.subtotal)
        .bind(totals.taxes)
        .bind(cmd.discount)
        .bind(totals.total)
        .bind(cmd.payment_method.as_str())
        .bind(sale_date)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for (product_id, name, qty, sell_price, cost_price) in lines {
            let item = sqlx::query_as::<_, SaleItem>(
                r#"
                INSERT INTO sale_items (sale_id, product_id, name, qty, sell_price, cost_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, sale_id, product_id, name, qty, sell_price, cost_price
                "#,
            )
            .bind(sale.id)
            .bind(product_id)
            .bind(&name)
            .bind(qty)
            .bind(sell_price)
            .bind(cost_price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        // Attach the sale reference to exactly the ledger entries created in
        // this call. A broader product-wide update here would rewrite other
        // sales' audit trails.
        sqlx::query("UPDATE stock_transactions SET sale_id = $1 WHERE id = ANY($2)")
            .bind(sale.id)
            .bind(&movement_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        // Reports must reflect the sale on the next read
        self.cache.clear();

        tracing::info!(invoice = %sale.invoice_number, total = %sale.total, "Sale created");

        Ok(SaleWithItems { sale, items })
    }

    /// Delete a sale and restore the deducted inventory.
    ///
    /// Each line gets a compensating adjustment entry, and the original sale
    /// entries are detached from the deleted sale. The ledger keeps netting
    /// to `current_stock`: the -qty sale entry and the +qty adjustment cancel
    /// out. The invoice number is never returned to the pool.
    pub async fn delete_sale(&self, sale_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, invoice_number, customer_name, customer_phone,
                   subtotal, taxes, discount, total,
                   payment_method, date, created_by, created_at
            FROM sales
            WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, name, qty, sell_price, cost_price
            FROM sale_items
            WHERE sale_id = $1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &items {
            // Restoring stock is always safe; no availability check needed.
            // A vanished product is skipped rather than failing the delete.
            let product_id = sqlx::query_scalar::<_, Uuid>(
                "SELECT id FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(product_id) = product_id else {
                continue;
            };

            sqlx::query(
                "UPDATE products SET current_stock = current_stock + $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(item.qty)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO stock_transactions (product_id, type, qty, unit_price, note, date)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(product_id)
            .bind(StockMovementKind::Adjustment.as_str())
            .bind(item.qty)
            .bind(item.sell_price)
            .bind(format!("Sale {} deleted", sale.invoice_number))
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        // Detach the original entries so nothing references the deleted sale
        sqlx::query("UPDATE stock_transactions SET sale_id = NULL WHERE sale_id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        // Line items cascade with the sale row
        sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.cache.clear();

        tracing::info!(invoice = %sale.invoice_number, "Sale deleted, inventory restored");

        Ok(())
    }

    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<SaleWithItems> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, invoice_number, customer_name, customer_phone,
                   subtotal, taxes, discount, total,
                   payment_method, date, created_by, created_at
            FROM sales
            WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, name, qty, sell_price, cost_price
            FROM sale_items
            WHERE sale_id = $1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SaleWithItems { sale, items })
    }

    pub async fn list_sales(&self, filter: SaleFilter) -> AppResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, invoice_number, customer_name, customer_phone,
                   subtotal, taxes, discount, total,
                   payment_method, date, created_by, created_at
            FROM sales
            WHERE ($1::TIMESTAMPTZ IS NULL OR date >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR date <= $2)
            ORDER BY date DESC
            "#,
        )
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.db)
        .await?;

        Ok(sales)
    }
}
