//! Expense command objects

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Command to record an operating expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExpenseCommand {
    pub category: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub date: Option<DateTime<Utc>>,
}
