//! Pricing: commission rates and shipping

mod commission;

pub use commission::CommissionCalculator;

use rust_decimal::Decimal;

/// Flat-rate shipping, waived at or above the free-shipping threshold
pub fn shipping_cost(subtotal: Decimal, flat_rate: Decimal, free_threshold: Decimal) -> Decimal {
    if subtotal >= free_threshold {
        Decimal::ZERO
    } else {
        flat_rate
    }
}
