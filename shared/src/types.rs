//! Common value types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment methods accepted at the point of sale
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Credit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Credit => "credit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "upi" => Some(PaymentMethod::Upi),
            "credit" => Some(PaymentMethod::Credit),
            _ => None,
        }
    }
}

/// Causes of a stock ledger movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StockMovementKind {
    Purchase,
    Sale,
    Adjustment,
}

impl StockMovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockMovementKind::Purchase => "purchase",
            StockMovementKind::Sale => "sale",
            StockMovementKind::Adjustment => "adjustment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(StockMovementKind::Purchase),
            "sale" => Some(StockMovementKind::Sale),
            "adjustment" => Some(StockMovementKind::Adjustment),
            _ => None,
        }
    }
}

/// Monetary breakdown of a finalized sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleTotals {
    pub subtotal: Decimal,
    pub taxes: Decimal,
    pub total: Decimal,
}

/// Compute sale totals from the accumulated line subtotal.
///
/// Taxes apply to the discounted base: `taxes = (subtotal - discount) * rate%`
/// and `total = subtotal - discount + taxes`.
pub fn compute_sale_totals(
    subtotal: Decimal,
    discount: Decimal,
    tax_rate_percent: Decimal,
) -> SaleTotals {
    let taxable = subtotal - discount;
    let taxes = taxable * tax_rate_percent / Decimal::from(100);
    SaleTotals {
        subtotal,
        taxes,
        total: taxable + taxes,
    }
}

/// Format a human-readable invoice number from the sequence counter.
///
/// The year component is the wall-clock year at issue time; the counter
/// itself is global and never resets per year.
pub fn format_invoice_number(year: i32, sequence: i64) -> String {
    format!("INV-{}-{:05}", year, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_sale_totals_formula() {
        // subtotal=100, discount=10, rate=5% -> taxes=4.5, total=94.5
        let totals = compute_sale_totals(dec("100"), dec("10"), dec("5"));
        assert_eq!(totals.taxes, dec("4.5"));
        assert_eq!(totals.total, dec("94.5"));
    }

    #[test]
    fn test_sale_totals_zero_rate() {
        let totals = compute_sale_totals(dec("250"), dec("0"), dec("0"));
        assert_eq!(totals.taxes, Decimal::ZERO);
        assert_eq!(totals.total, dec("250"));
    }

    #[test]
    fn test_invoice_number_format() {
        assert_eq!(format_invoice_number(2025, 1), "INV-2025-00001");
        assert_eq!(format_invoice_number(2026, 42), "INV-2026-00042");
        // Counters past five digits are not truncated
        assert_eq!(format_invoice_number(2026, 123456), "INV-2026-123456");
    }

    #[test]
    fn test_payment_method_round_trip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Card,
            PaymentMethod::Upi,
            PaymentMethod::Credit,
        ] {
            assert_eq!(PaymentMethod::from_str(method.as_str()), Some(method));
        }
        assert_eq!(PaymentMethod::from_str("cheque"), None);
    }
}
