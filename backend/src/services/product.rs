//! Product catalog service
//!
//! Catalog CRUD plus the per-product stock ledger view. Stock levels are
//! never edited here directly; the ledger is only moved by purchases, sales,
//! their deletions, and the opening-stock adjustment written at creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{CreateProductCommand, UpdateProductCommand};
use shared::types::StockMovementKind;
use shared::validation::{validate_product_command, validate_product_update};

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// A stocked catalog item
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub cost_price: Decimal,
    pub sell_price: Decimal,
    pub unit: String,
    pub current_stock: i64,
    pub reorder_threshold: i64,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One immutable ledger entry for a product
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockTransaction {
    pub id: Uuid,
    pub product_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub qty: i64,
    pub unit_price: Decimal,
    pub sale_id: Option<Uuid>,
    pub purchase_id: Option<Uuid>,
    pub note: Option<String>,
    pub date: DateTime<Utc>,
}

/// Listing filters for the catalog
#[derive(Debug, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub low_stock: bool,
}

const PRODUCT_COLUMNS: &str = "id, sku, name, category, cost_price, sell_price, unit, \
     current_stock, reorder_threshold, created_by, updated_by, created_at, updated_at";

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_products(&self, filter: ProductFilter) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE ($1::TEXT IS NULL OR category = $1)
              AND (NOT $2 OR current_stock < reorder_threshold)
            ORDER BY created_at DESC
            "#
        ))
        .bind(&filter.category)
        .bind(filter.low_stock)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Add a product to the catalog.
    ///
    /// An opening stock greater than zero is recorded through an adjustment
    /// ledger entry in the same transaction, so the running-balance invariant
    /// holds from the first write.
    pub async fn create_product(
        &self,
        user_id: Uuid,
        cmd: CreateProductCommand,
    ) -> AppResult<Product> {
        validate_product_command(&cmd)?;

        let sku = cmd.sku.trim().to_uppercase();

        let mut tx = self.db.begin().await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (
                sku, name, category, cost_price, sell_price, unit,
                current_stock, reorder_threshold, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&sku)
        .bind(cmd.name.trim())
        .bind(cmd.category.trim())
        .bind(cmd.cost_price)
        .bind(cmd.sell_price)
        .bind(cmd.unit.trim())
        .bind(cmd.opening_stock)
        .bind(cmd.reorder_threshold)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateEntry("sku".to_string());
                }
            }
            e.into()
        })?;

        if cmd.opening_stock > 0 {
            sqlx::query(
                r#"
                INSERT INTO stock_transactions (product_id, type, qty, unit_price, created_by, note, date)
                VALUES ($1, $2, $3, $4, $5, 'Opening stock', $6)
                "#,
            )
            .bind(product.id)
            .bind(StockMovementKind::Adjustment.as_str())
            .bind(cmd.opening_stock)
            .bind(cmd.cost_price)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(sku = %product.sku, "Product created");

        Ok(product)
    }

    pub async fn update_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        cmd: UpdateProductCommand,
    ) -> AppResult<Product> {
        validate_product_update(&cmd)?;

        let existing = self.get_product(product_id).await?;

        let sku = match cmd.sku {
            Some(sku) => sku.trim().to_uppercase(),
            None => existing.sku,
        };
        let name = cmd.name.unwrap_or(existing.name);
        let category = cmd.category.unwrap_or(existing.category);
        let cost_price = cmd.cost_price.unwrap_or(existing.cost_price);
        let sell_price = cmd.sell_price.unwrap_or(existing.sell_price);
        let unit = cmd.unit.unwrap_or(existing.unit);
        let reorder_threshold = cmd.reorder_threshold.unwrap_or(existing.reorder_threshold);

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET sku = $1, name = $2, category = $3, cost_price = $4, sell_price = $5,
                unit = $6, reorder_threshold = $7, updated_by = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&sku)
        .bind(&name)
        .bind(&category)
        .bind(cost_price)
        .bind(sell_price)
        .bind(&unit)
        .bind(reorder_threshold)
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateEntry("sku".to_string());
                }
            }
            e.into()
        })?;

        Ok(product)
    }

    /// Delete a product.
    ///
    /// Blocked while any sale or purchase line references it; the ledger
    /// history behind those documents must stay intact.
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let used_in_sales = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sale_items WHERE product_id = $1)",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if used_in_sales {
            return Err(AppError::Conflict {
                resource: "product".to_string(),
                message: "Product has been used in sales transactions; archive it instead"
                    .to_string(),
            });
        }

        let used_in_purchases = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM purchase_items WHERE product_id = $1)",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if used_in_purchases {
            return Err(AppError::Conflict {
                resource: "product".to_string(),
                message: "Product has been used in purchase transactions; archive it instead"
                    .to_string(),
            });
        }

        // Remaining ledger rows (opening stock adjustments) cascade
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        tracing::info!(product_id = %product_id, "Product deleted");

        Ok(())
    }

    /// The product's full stock ledger, newest first
    pub async fn stock_ledger(&self, product_id: Uuid) -> AppResult<Vec<StockTransaction>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let transactions = sqlx::query_as::<_, StockTransaction>(
            r#"
            SELECT id, product_id, type AS kind, qty, unit_price, sale_id, purchase_id, note, date
            FROM stock_transactions
            WHERE product_id = $1
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(transactions)
    }
}
