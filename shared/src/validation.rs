//! Validation for command objects
//!
//! The core services run these checks on every command before touching the
//! store, whatever the boundary layer already validated.

use rust_decimal::Decimal;

use crate::models::{
    CreateExpenseCommand, CreateProductCommand, CreatePurchaseCommand, CreateSaleCommand,
    UpdateProductCommand,
};

/// A rejected command field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct CommandError {
    pub field: &'static str,
    pub message: &'static str,
}

impl CommandError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

// ============================================================================
// Sale Commands
// ============================================================================

pub fn validate_sale_command(cmd: &CreateSaleCommand) -> Result<(), CommandError> {
    if cmd.items.is_empty() {
        return Err(CommandError::new("items", "At least one line item is required"));
    }
    for item in &cmd.items {
        if item.qty <= 0 {
            return Err(CommandError::new("items.qty", "Quantity must be positive"));
        }
        if let Some(price) = item.sell_price {
            if price < Decimal::ZERO {
                return Err(CommandError::new(
                    "items.sell_price",
                    "Sell price cannot be negative",
                ));
            }
        }
    }
    if cmd.discount < Decimal::ZERO {
        return Err(CommandError::new("discount", "Discount cannot be negative"));
    }
    Ok(())
}

// ============================================================================
// Purchase Commands
// ============================================================================

pub fn validate_purchase_command(cmd: &CreatePurchaseCommand) -> Result<(), CommandError> {
    if cmd.supplier.trim().is_empty() {
        return Err(CommandError::new("supplier", "Supplier name is required"));
    }
    if cmd.items.is_empty() {
        return Err(CommandError::new("items", "At least one line item is required"));
    }
    for item in &cmd.items {
        if item.qty <= 0 {
            return Err(CommandError::new("items.qty", "Quantity must be positive"));
        }
        if item.cost_price < Decimal::ZERO {
            return Err(CommandError::new(
                "items.cost_price",
                "Cost price cannot be negative",
            ));
        }
    }
    Ok(())
}

// ============================================================================
// Product Commands
// ============================================================================

pub fn validate_product_command(cmd: &CreateProductCommand) -> Result<(), CommandError> {
    if cmd.sku.trim().is_empty() {
        return Err(CommandError::new("sku", "SKU is required"));
    }
    if cmd.name.trim().is_empty() {
        return Err(CommandError::new("name", "Product name is required"));
    }
    if cmd.category.trim().is_empty() {
        return Err(CommandError::new("category", "Category is required"));
    }
    if cmd.cost_price < Decimal::ZERO {
        return Err(CommandError::new("cost_price", "Cost price cannot be negative"));
    }
    if cmd.sell_price < Decimal::ZERO {
        return Err(CommandError::new("sell_price", "Sell price cannot be negative"));
    }
    if cmd.opening_stock < 0 {
        return Err(CommandError::new(
            "opening_stock",
            "Opening stock cannot be negative",
        ));
    }
    if cmd.reorder_threshold < 0 {
        return Err(CommandError::new(
            "reorder_threshold",
            "Reorder threshold cannot be negative",
        ));
    }
    Ok(())
}

pub fn validate_product_update(cmd: &UpdateProductCommand) -> Result<(), CommandError> {
    if let Some(ref sku) = cmd.sku {
        if sku.trim().is_empty() {
            return Err(CommandError::new("sku", "SKU cannot be empty"));
        }
    }
    if let Some(ref name) = cmd.name {
        if name.trim().is_empty() {
            return Err(CommandError::new("name", "Product name cannot be empty"));
        }
    }
    if let Some(price) = cmd.cost_price {
        if price < Decimal::ZERO {
            return Err(CommandError::new("cost_price", "Cost price cannot be negative"));
        }
    }
    if let Some(price) = cmd.sell_price {
        if price < Decimal::ZERO {
            return Err(CommandError::new("sell_price", "Sell price cannot be negative"));
        }
    }
    if let Some(threshold) = cmd.reorder_threshold {
        if threshold < 0 {
            return Err(CommandError::new(
                "reorder_threshold",
                "Reorder threshold cannot be negative",
            ));
        }
    }
    Ok(())
}

// ============================================================================
// Expense Commands
// ============================================================================

pub fn validate_expense_command(cmd: &CreateExpenseCommand) -> Result<(), CommandError> {
    if cmd.category.trim().is_empty() {
        return Err(CommandError::new("category", "Category is required"));
    }
    if cmd.amount < Decimal::ZERO {
        return Err(CommandError::new("amount", "Amount cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SaleItemInput;
    use crate::types::PaymentMethod;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn sale_cmd(items: Vec<SaleItemInput>, discount: Decimal) -> CreateSaleCommand {
        CreateSaleCommand {
            items,
            customer: None,
            payment_method: PaymentMethod::Cash,
            discount,
        }
    }

    #[test]
    fn test_sale_requires_items() {
        let err = validate_sale_command(&sale_cmd(vec![], Decimal::ZERO)).unwrap_err();
        assert_eq!(err.field, "items");
    }

    #[test]
    fn test_sale_rejects_non_positive_qty() {
        for qty in [0, -3] {
            let cmd = sale_cmd(
                vec![SaleItemInput {
                    product_id: Uuid::new_v4(),
                    qty,
                    sell_price: None,
                }],
                Decimal::ZERO,
            );
            let err = validate_sale_command(&cmd).unwrap_err();
            assert_eq!(err.field, "items.qty");
        }
    }

    #[test]
    fn test_sale_rejects_negative_discount() {
        let cmd = sale_cmd(
            vec![SaleItemInput {
                product_id: Uuid::new_v4(),
                qty: 1,
                sell_price: None,
            }],
            Decimal::from(-1),
        );
        let err = validate_sale_command(&cmd).unwrap_err();
        assert_eq!(err.field, "discount");
    }

    #[test]
    fn test_purchase_requires_supplier() {
        let cmd = CreatePurchaseCommand {
            supplier: "  ".to_string(),
            items: vec![],
            invoice_ref: None,
        };
        let err = validate_purchase_command(&cmd).unwrap_err();
        assert_eq!(err.field, "supplier");
    }

    proptest! {
        /// Any sale with positive quantities and non-negative prices passes
        #[test]
        fn prop_valid_sales_accepted(
            qtys in prop::collection::vec(1i64..10_000, 1..10),
            discount in 0u32..1_000,
        ) {
            let items = qtys
                .into_iter()
                .map(|qty| SaleItemInput {
                    product_id: Uuid::new_v4(),
                    qty,
                    sell_price: None,
                })
                .collect();
            prop_assert!(validate_sale_command(&sale_cmd(items, Decimal::from(discount))).is_ok());
        }

        /// Quantity zero or below is always rejected
        #[test]
        fn prop_non_positive_qty_rejected(qty in -10_000i64..=0) {
            let cmd = sale_cmd(
                vec![SaleItemInput {
                    product_id: Uuid::new_v4(),
                    qty,
                    sell_price: None,
                }],
                Decimal::ZERO,
            );
            prop_assert!(validate_sale_command(&cmd).is_err());
        }
    }
}
