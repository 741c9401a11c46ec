//! Money arithmetic using rust_decimal
//!
//! Every monetary value in the engine is a `Decimal`; binary floating point
//! never enters a calculation. Ledger comparisons are exact, not within an
//! epsilon.

use rust_decimal::prelude::*;

use crate::orders::OrderError;

/// Monetary values carry 2 minor units (cents)
pub const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per unit
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Maximum allowed quantity per line item
pub const MAX_QUANTITY: u32 = 9999;
/// Maximum allowed single payment amount
pub const MAX_PAYMENT_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Round to minor units, half away from zero (totals, commissions)
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Round down to the minor unit (coupon discounts are never rounded up)
#[inline]
pub fn floor_minor_unit(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::ToZero)
}

/// `base * pct / 100`, unrounded
#[inline]
pub fn percent_of(base: Decimal, pct: Decimal) -> Decimal {
    base * pct / Decimal::ONE_HUNDRED
}

/// Validate a per-unit price
pub fn validate_price(field: &str, value: Decimal) -> Result<(), OrderError> {
    if value < Decimal::ZERO {
        return Err(OrderError::Validation(format!(
            "{} must be non-negative, got {}",
            field, value
        )));
    }
    if value > MAX_PRICE {
        return Err(OrderError::Validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field, MAX_PRICE, value
        )));
    }
    Ok(())
}

/// Validate a line-item quantity
pub fn validate_quantity(quantity: u32) -> Result<(), OrderError> {
    if quantity == 0 {
        return Err(OrderError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::Validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

/// Validate a payment amount (strictly positive, bounded)
pub fn validate_payment_amount(amount: Decimal) -> Result<(), OrderError> {
    if amount <= Decimal::ZERO {
        return Err(OrderError::Validation(format!(
            "payment amount must be positive, got {}",
            amount
        )));
    }
    if amount > MAX_PAYMENT_AMOUNT {
        return Err(OrderError::Validation(format!(
            "payment amount exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn round_money_half_up() {
        assert_eq!(round_money(dec("0.005")), dec("0.01"));
        assert_eq!(round_money(dec("0.004")), dec("0.00"));
        assert_eq!(round_money(dec("41.250")), dec("41.25"));
    }

    #[test]
    fn floor_never_rounds_up() {
        assert_eq!(floor_minor_unit(dec("49.999")), dec("49.99"));
        assert_eq!(floor_minor_unit(dec("50.001")), dec("50.00"));
    }

    #[test]
    fn percent_of_is_exact() {
        // 8.25% of 500 == 41.25 exactly, no epsilon involved
        assert_eq!(round_money(percent_of(dec("500"), dec("8.25"))), dec("41.25"));
        // 20% of 400 == 80
        assert_eq!(percent_of(dec("400"), dec("20")), dec("80"));
    }

    #[test]
    fn accumulation_is_exact() {
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += dec("0.01");
        }
        assert_eq!(total, dec("10.00"));
    }

    #[test]
    fn validate_price_bounds() {
        assert!(validate_price("unitPrice", dec("10.99")).is_ok());
        assert!(validate_price("unitPrice", dec("-0.01")).is_err());
        assert!(validate_price("unitPrice", dec("1000001")).is_err());
    }

    #[test]
    fn validate_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(10_000).is_err());
    }

    #[test]
    fn validate_payment_amount_bounds() {
        assert!(validate_payment_amount(dec("0.01")).is_ok());
        assert!(validate_payment_amount(Decimal::ZERO).is_err());
        assert!(validate_payment_amount(dec("-5")).is_err());
    }
}
