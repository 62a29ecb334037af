//! Stock accounting engine tests
//!
//! Exercises the engine semantics against an in-memory ledger model:
//! - every stock change is paired with exactly one ledger entry
//! - for each product, current stock always equals the ledger sum
//! - failed operations leave no partial state
//! - create-then-delete round trips restore the starting state

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
enum LedgerError {
    NotFound,
    InsufficientStock { available: i64 },
}

#[derive(Debug, Clone)]
struct ProductState {
    current_stock: i64,
    cost_price: Decimal,
}

#[derive(Debug, Clone)]
struct LedgerEntry {
    product: u32,
    qty: i64,
    sale: Option<u32>,
    purchase: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
struct Line {
    product: u32,
    qty: i64,
    price: Decimal,
}

/// In-memory model of the stock accounting engine. Operations apply fully or
/// not at all, mirroring the transactional service behavior.
#[derive(Default)]
struct Ledger {
    products: HashMap<u32, ProductState>,
    entries: Vec<LedgerEntry>,
    sales: HashMap<u32, Vec<Line>>,
    purchases: HashMap<u32, Vec<Line>>,
    next_id: u32,
}

impl Ledger {
    fn add_product(&mut self, stock: i64) -> u32 {
        let id = self.bump();
        self.products.insert(
            id,
            ProductState {
                current_stock: stock,
                cost_price: Decimal::ZERO,
            },
        );
        if stock != 0 {
            self.entries.push(LedgerEntry {
                product: id,
                qty: stock,
                sale: None,
                purchase: None,
            });
        }
        id
    }

    fn create_purchase(&mut self, lines: &[Line]) -> Result<u32, LedgerError> {
        for line in lines {
            if !self.products.contains_key(&line.product) {
                return Err(LedgerError::NotFound);
            }
        }
        let id = self.bump();
        for line in lines {
            let product = self.products.get_mut(&line.product).unwrap();
            product.current_stock += line.qty;
            product.cost_price = line.price;
            self.entries.push(LedgerEntry {
                product: line.product,
                qty: line.qty,
                sale: None,
                purchase: Some(id),
            });
        }
        self.purchases.insert(id, lines.to_vec());
        Ok(id)
    }

    fn create_sale(&mut self, lines: &[Line]) -> Result<u32, LedgerError> {
        // Apply line by line and roll everything back on the first failure,
        // the way the transactional service aborts mid-operation. Each check
        // sees the stock already deducted by earlier lines of the same sale.
        let products_snapshot = self.products.clone();
        let entries_len = self.entries.len();

        let id = self.bump();
        for line in lines {
            let result = match self.products.get_mut(&line.product) {
                None => Err(LedgerError::NotFound),
                Some(product) if product.current_stock < line.qty => {
                    Err(LedgerError::InsufficientStock {
                        available: product.current_stock,
                    })
                }
                Some(product) => {
                    product.current_stock -= line.qty;
                    Ok(())
                }
            };

            if let Err(err) = result {
                self.products = products_snapshot;
                self.entries.truncate(entries_len);
                return Err(err);
            }

            self.entries.push(LedgerEntry {
                product: line.product,
                qty: -line.qty,
                sale: Some(id),
                purchase: None,
            });
        }
        self.sales.insert(id, lines.to_vec());
        Ok(id)
    }

    fn delete_sale(&mut self, id: u32) -> Result<(), LedgerError> {
        let lines = self.sales.remove(&id).ok_or(LedgerError::NotFound)?;
        for line in &lines {
            let product = self.products.get_mut(&line.product).unwrap();
            product.current_stock += line.qty;
            // Compensating adjustment entry
            self.entries.push(LedgerEntry {
                product: line.product,
                qty: line.qty,
                sale: None,
                purchase: None,
            });
        }
        // Originals stay in the ledger but no longer reference the sale
        for entry in &mut self.entries {
            if entry.sale == Some(id) {
                entry.sale = None;
            }
        }
        Ok(())
    }

    fn delete_purchase(&mut self, id: u32) -> Result<(), LedgerError> {
        let lines = self.purchases.get(&id).ok_or(LedgerError::NotFound)?.clone();
        // Validate first: removing sold-through stock must fail atomically
        for line in &lines {
            let product = self.products.get(&line.product).unwrap();
            if product.current_stock < line.qty {
                return Err(LedgerError::InsufficientStock {
                    available: product.current_stock,
                });
            }
        }
        self.purchases.remove(&id);
        for line in &lines {
            let product = self.products.get_mut(&line.product).unwrap();
            product.current_stock -= line.qty;
            self.entries.push(LedgerEntry {
                product: line.product,
                qty: -line.qty,
                sale: None,
                purchase: None,
            });
        }
        for entry in &mut self.entries {
            if entry.purchase == Some(id) {
                entry.purchase = None;
            }
        }
        Ok(())
    }

    fn stock(&self, product: u32) -> i64 {
        self.products[&product].current_stock
    }

    fn ledger_sum(&self, product: u32) -> i64 {
        self.entries
            .iter()
            .filter(|e| e.product == product)
            .map(|e| e.qty)
            .sum()
    }

    fn entries_for_sale(&self, sale: u32) -> usize {
        self.entries.iter().filter(|e| e.sale == Some(sale)).count()
    }

    /// The central invariant: stock equals the ledger sum for every product
    fn check_invariant(&self) {
        for (&id, product) in &self.products {
            assert_eq!(
                product.current_stock,
                self.ledger_sum(id),
                "ledger sum diverged for product {}",
                id
            );
        }
    }

    fn bump(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

fn line(product: u32, qty: i64, price: i64) -> Line {
    Line {
        product,
        qty,
        price: Decimal::from(price),
    }
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn test_oversell_rejected_without_side_effects() {
    let mut ledger = Ledger::default();
    let product = ledger.add_product(5);
    let entries_before = ledger.entries.len();

    let result = ledger.create_sale(&[line(product, 6, 10)]);

    assert_eq!(
        result,
        Err(LedgerError::InsufficientStock { available: 5 })
    );
    assert_eq!(ledger.stock(product), 5);
    assert_eq!(ledger.entries.len(), entries_before);
    assert!(ledger.sales.is_empty());
    ledger.check_invariant();
}

#[test]
fn test_multi_line_sale_aborts_entirely_on_late_failure() {
    let mut ledger = Ledger::default();
    let first = ledger.add_product(10);
    let second = ledger.add_product(1);

    // Second line oversells; the first line must not be applied either
    let result = ledger.create_sale(&[line(first, 3, 10), line(second, 2, 10)]);

    assert!(result.is_err());
    assert_eq!(ledger.stock(first), 10);
    assert_eq!(ledger.stock(second), 1);
    ledger.check_invariant();
}

#[test]
fn test_duplicate_lines_checked_against_deducted_stock() {
    let mut ledger = Ledger::default();
    let product = ledger.add_product(5);

    // Two lines of 3 against stock 5: the second sees only 2 remaining
    let result = ledger.create_sale(&[line(product, 3, 10), line(product, 3, 10)]);

    assert_eq!(
        result,
        Err(LedgerError::InsufficientStock { available: 2 })
    );
    assert_eq!(ledger.stock(product), 5);
    ledger.check_invariant();
}

#[test]
fn test_unknown_product_rejected() {
    let mut ledger = Ledger::default();
    assert_eq!(
        ledger.create_sale(&[line(999, 1, 10)]),
        Err(LedgerError::NotFound)
    );
    assert_eq!(ledger.create_purchase(&[line(999, 1, 10)]), Err(LedgerError::NotFound));
}

#[test]
fn test_purchase_then_sale_then_delete_sale() {
    let mut ledger = Ledger::default();
    let product = ledger.add_product(0);

    ledger.create_purchase(&[line(product, 10, 2)]).unwrap();
    assert_eq!(ledger.stock(product), 10);
    assert_eq!(ledger.products[&product].cost_price, Decimal::from(2));
    ledger.check_invariant();

    let sale = ledger.create_sale(&[line(product, 4, 5)]).unwrap();
    assert_eq!(ledger.stock(product), 6);
    ledger.check_invariant();

    ledger.delete_sale(sale).unwrap();
    assert_eq!(ledger.stock(product), 10);
    // Nothing in the ledger still references the deleted sale
    assert_eq!(ledger.entries_for_sale(sale), 0);
    ledger.check_invariant();
}

#[test]
fn test_delete_purchase_restores_starting_stock() {
    let mut ledger = Ledger::default();
    let product = ledger.add_product(3);

    let purchase = ledger.create_purchase(&[line(product, 7, 4)]).unwrap();
    assert_eq!(ledger.stock(product), 10);

    ledger.delete_purchase(purchase).unwrap();
    assert_eq!(ledger.stock(product), 3);
    ledger.check_invariant();
}

#[test]
fn test_delete_purchase_blocked_after_sell_through() {
    let mut ledger = Ledger::default();
    let product = ledger.add_product(0);

    let purchase = ledger.create_purchase(&[line(product, 10, 2)]).unwrap();
    ledger.create_sale(&[line(product, 8, 5)]).unwrap();

    // Only 2 left of the 10 purchased: the stock cannot be given back
    let result = ledger.delete_purchase(purchase);
    assert_eq!(
        result,
        Err(LedgerError::InsufficientStock { available: 2 })
    );
    assert_eq!(ledger.stock(product), 2);
    ledger.check_invariant();
}

#[test]
fn test_last_cost_wins_on_repeated_purchase_lines() {
    let mut ledger = Ledger::default();
    let product = ledger.add_product(0);

    ledger
        .create_purchase(&[line(product, 5, 3), line(product, 5, 4)])
        .unwrap();

    assert_eq!(ledger.stock(product), 10);
    assert_eq!(ledger.products[&product].cost_price, Decimal::from(4));
    ledger.check_invariant();
}

// ============================================================================
// Property Tests
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Purchase { qty: i64, price: i64 },
    Sale { qty: i64 },
    DeleteLastSale,
    DeleteLastPurchase,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1i64..50, 1i64..100).prop_map(|(qty, price)| Op::Purchase { qty, price }),
        (1i64..50).prop_map(|qty| Op::Sale { qty }),
        Just(Op::DeleteLastSale),
        Just(Op::DeleteLastPurchase),
    ]
}

proptest! {
    /// Whatever sequence of operations runs, and whichever of them fail,
    /// stock and ledger sum never diverge and stock never goes negative.
    #[test]
    fn prop_ledger_sum_tracks_stock(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut ledger = Ledger::default();
        let product = ledger.add_product(0);
        let mut sale_ids = Vec::new();
        let mut purchase_ids = Vec::new();

        for op in ops {
            match op {
                Op::Purchase { qty, price } => {
                    let id = ledger.create_purchase(&[line(product, qty, price)]).unwrap();
                    purchase_ids.push(id);
                }
                Op::Sale { qty } => {
                    if let Ok(id) = ledger.create_sale(&[line(product, qty, 10)]) {
                        sale_ids.push(id);
                    }
                }
                Op::DeleteLastSale => {
                    if let Some(id) = sale_ids.pop() {
                        ledger.delete_sale(id).unwrap();
                    }
                }
                Op::DeleteLastPurchase => {
                    if let Some(id) = purchase_ids.pop() {
                        // May legitimately fail after sell-through
                        let _ = ledger.delete_purchase(id);
                    }
                }
            }

            ledger.check_invariant();
            prop_assert!(ledger.stock(product) >= 0);
        }
    }

    /// A sale followed by its deletion is a no-op on stock
    #[test]
    fn prop_sale_round_trip_restores_stock(
        initial in 1i64..1000,
        qty in 1i64..1000,
    ) {
        let mut ledger = Ledger::default();
        let product = ledger.add_product(initial);

        if let Ok(sale) = ledger.create_sale(&[line(product, qty, 10)]) {
            ledger.delete_sale(sale).unwrap();
            prop_assert_eq!(ledger.stock(product), initial);
            prop_assert_eq!(ledger.ledger_sum(product), initial);
            prop_assert_eq!(ledger.entries_for_sale(sale), 0);
        } else {
            // Oversell: nothing changed
            prop_assert_eq!(ledger.stock(product), initial);
        }
    }
}
