//! Aggregate reporting engine
//!
//! Read-only analytics over the ledger. Every query result is cached under
//! its full parameter tuple with a short TTL; the mutating services clear
//! the cache so the next read after any ledger change recomputes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::ReportCache;

pub const DEFAULT_LOW_STOCK_LIMIT: i64 = 20;

/// Reporting service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
    cache: Arc<ReportCache>,
}

/// Profit and loss summary for a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub revenue: Decimal,
    pub cogs: Decimal,
    pub gross_profit: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    pub sales_count: i64,
    pub period: ReportPeriod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// One row of the top-products ranking
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub total_qty: i64,
    pub total_revenue: Decimal,
}

/// A product below its reorder threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowStockProduct {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub current_stock: i64,
    pub reorder_threshold: i64,
    /// Units sold in the trailing seven days; 0 when none
    pub sold_last_7_days: i64,
}

#[derive(Debug, FromRow)]
struct SalesTotalsRow {
    revenue: Decimal,
    sales_count: i64,
}

#[derive(Debug, FromRow)]
struct LowStockRow {
    id: Uuid,
    sku: String,
    name: String,
    category: String,
    current_stock: i64,
    reorder_threshold: i64,
}

#[derive(Debug, FromRow)]
struct ProductQtyRow {
    product_id: Uuid,
    total_qty: i64,
}

impl ReportService {
    pub fn new(db: PgPool, cache: Arc<ReportCache>) -> Self {
        Self { db, cache }
    }

    /// Revenue, COGS, profit and expense totals for [from, to]
    pub async fn summary(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<SummaryReport> {
        let from = from.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let to = to.unwrap_or_else(Utc::now);

        let cache_key = format!("summary:{}:{}", from.timestamp(), to.timestamp());
        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(report) = serde_json::from_value(cached) {
                return Ok(report);
            }
        }

        let sales = sqlx::query_as::<_, SalesTotalsRow>(
            r#"
            SELECT COALESCE(SUM(total), 0) AS revenue, COUNT(*) AS sales_count
            FROM sales
            WHERE date BETWEEN $1 AND $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.db)
        .await?;

        // COGS uses the cost snapshot taken at sale time, so later catalog
        // price changes do not rewrite history
        let cogs = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(si.qty * si.cost_price), 0)
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.date BETWEEN $1 AND $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.db)
        .await?;

        let total_expenses = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE date BETWEEN $1 AND $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.db)
        .await?;

        let gross_profit = sales.revenue - cogs;
        let report = SummaryReport {
            revenue: sales.revenue,
            cogs,
            gross_profit,
            total_expenses,
            net_profit: gross_profit - total_expenses,
            sales_count: sales.sales_count,
            period: ReportPeriod { from, to },
        };

        if let Ok(value) = serde_json::to_value(&report) {
            self.cache.set(&cache_key, value);
        }

        Ok(report)
    }

    /// Best sellers by unit volume over the trailing period
    pub async fn top_products(&self, period_days: i64, limit: i64) -> AppResult<Vec<TopProduct>> {
        let cache_key = format!("top_products:{}:{}", period_days, limit);
        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(products) = serde_json::from_value(cached) {
                return Ok(products);
            }
        }

        let from = Utc::now() - Duration::days(period_days);

        let products = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT si.product_id,
                   MIN(si.name) AS product_name,
                   SUM(si.qty)::BIGINT AS total_qty,
                   SUM(si.qty * si.sell_price) AS total_revenue
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.date >= $1
            GROUP BY si.product_id
            ORDER BY total_qty DESC
            LIMIT $2
            "#,
        )
        .bind(from)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        if let Ok(value) = serde_json::to_value(&products) {
            self.cache.set(&cache_key, value);
        }

        Ok(products)
    }

    /// Products below their reorder threshold, most urgent first
    pub async fn low_stock(&self, limit: i64) -> AppResult<Vec<LowStockProduct>> {
        let cache_key = format!("low_stock:{}", limit);
        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(products) = serde_json::from_value(cached) {
                return Ok(products);
            }
        }

        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT id, sku, name, category, current_stock, reorder_threshold
            FROM products
            WHERE current_stock < reorder_threshold
            ORDER BY current_stock ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        let product_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let week_ago = Utc::now() - Duration::days(7);

        let sold: Vec<ProductQtyRow> = if product_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as::<_, ProductQtyRow>(
                r#"
                SELECT si.product_id, SUM(si.qty)::BIGINT AS total_qty
                FROM sale_items si
                JOIN sales s ON s.id = si.sale_id
                WHERE s.date >= $1 AND si.product_id = ANY($2)
                GROUP BY si.product_id
                "#,
            )
            .bind(week_ago)
            .bind(&product_ids)
            .fetch_all(&self.db)
            .await?
        };

        let sold_by_product: HashMap<Uuid, i64> = sold
            .into_iter()
            .map(|row| (row.product_id, row.total_qty))
            .collect();

        let products: Vec<LowStockProduct> = rows
            .into_iter()
            .map(|row| LowStockProduct {
                sold_last_7_days: sold_by_product.get(&row.id).copied().unwrap_or(0),
                id: row.id,
                sku: row.sku,
                name: row.name,
                category: row.category,
                current_stock: row.current_stock,
                reorder_threshold: row.reorder_threshold,
            })
            .collect();

        if let Ok(value) = serde_json::to_value(&products) {
            self.cache.set(&cache_key, value);
        }

        Ok(products)
    }
}
