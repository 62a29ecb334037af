//! Product catalog command objects

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Command to add a product to the catalog
///
/// `opening_stock` seeds the ledger with an adjustment entry so the running
/// balance invariant holds from the first day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductCommand {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub cost_price: Decimal,
    pub sell_price: Decimal,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub opening_stock: i64,
    #[serde(default = "default_reorder_threshold")]
    pub reorder_threshold: i64,
}

fn default_unit() -> String {
    "pcs".to_string()
}

fn default_reorder_threshold() -> i64 {
    10
}

/// Command to update catalog fields of a product
///
/// Stock is never edited here; only purchases, sales, and their deletions
/// move the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProductCommand {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub cost_price: Option<Decimal>,
    pub sell_price: Option<Decimal>,
    pub unit: Option<String>,
    pub reorder_threshold: Option<i64>,
}
