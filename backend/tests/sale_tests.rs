//! Sale total computation tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::types::compute_sale_totals;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_reference_formula() {
    // subtotal=100, discount=10, taxRate=5% -> taxes=4.5, total=94.5
    let totals = compute_sale_totals(dec("100"), dec("10"), dec("5"));
    assert_eq!(totals.subtotal, dec("100"));
    assert_eq!(totals.taxes, dec("4.5"));
    assert_eq!(totals.total, dec("94.5"));
}

#[test]
fn test_no_discount_no_tax() {
    let totals = compute_sale_totals(dec("59.97"), Decimal::ZERO, Decimal::ZERO);
    assert_eq!(totals.taxes, Decimal::ZERO);
    assert_eq!(totals.total, dec("59.97"));
}

#[test]
fn test_tax_applies_to_discounted_base() {
    // Tax on (200 - 50), not on 200
    let totals = compute_sale_totals(dec("200"), dec("50"), dec("10"));
    assert_eq!(totals.taxes, dec("15"));
    assert_eq!(totals.total, dec("165"));
}

#[test]
fn test_fractional_prices_stay_exact() {
    // 3 * 19.99 = 59.97, 7% tax
    let subtotal = dec("19.99") * Decimal::from(3);
    let totals = compute_sale_totals(subtotal, Decimal::ZERO, dec("7"));
    assert_eq!(totals.taxes, dec("4.1979"));
    assert_eq!(totals.total, dec("64.1679"));
}

#[test]
fn test_full_discount() {
    let totals = compute_sale_totals(dec("80"), dec("80"), dec("5"));
    assert_eq!(totals.taxes, Decimal::ZERO);
    assert_eq!(totals.total, Decimal::ZERO);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// total always equals subtotal - discount + taxes
    #[test]
    fn prop_total_identity(
        subtotal in 0u64..1_000_000,
        discount in 0u64..1_000_000,
        rate in 0u32..100,
    ) {
        let subtotal = Decimal::from(subtotal);
        let discount = Decimal::from(discount);
        let rate = Decimal::from(rate);

        let totals = compute_sale_totals(subtotal, discount, rate);
        prop_assert_eq!(totals.total, subtotal - discount + totals.taxes);
    }

    /// taxes always equal (subtotal - discount) * rate / 100
    #[test]
    fn prop_tax_formula(
        subtotal in 0u64..1_000_000,
        rate in 0u32..100,
    ) {
        let subtotal = Decimal::from(subtotal);
        let rate = Decimal::from(rate);

        let totals = compute_sale_totals(subtotal, Decimal::ZERO, rate);
        prop_assert_eq!(totals.taxes, subtotal * rate / Decimal::from(100));
    }

    /// A zero tax rate never changes the payable amount
    #[test]
    fn prop_zero_rate_is_passthrough(subtotal in 0u64..1_000_000, discount in 0u64..1_000) {
        let subtotal = Decimal::from(subtotal);
        let discount = Decimal::from(discount);

        let totals = compute_sale_totals(subtotal, discount, Decimal::ZERO);
        prop_assert_eq!(totals.total, subtotal - discount);
    }
}
