//! Purchase command objects

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One restocked line on a supplier purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItemInput {
    pub product_id: Uuid,
    pub qty: i64,
    pub cost_price: Decimal,
}

/// Command to record a supplier purchase and add inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePurchaseCommand {
    pub supplier: String,
    pub items: Vec<PurchaseItemInput>,
    pub invoice_ref: Option<String>,
}
