//! Sale command objects

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::PaymentMethod;

/// Optional walk-in customer details captured on a sale
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Customer {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// One requested sale line
///
/// `sell_price` overrides the product's listed price when present; the
/// product's current price is used otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItemInput {
    pub product_id: Uuid,
    pub qty: i64,
    pub sell_price: Option<Decimal>,
}

/// Command to create a sale and deduct inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSaleCommand {
    pub items: Vec<SaleItemInput>,
    pub customer: Option<Customer>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub discount: Decimal,
}
