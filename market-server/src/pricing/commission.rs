//! Platform commission
//!
//! Rates are percentages. Lookup precedence: (seller, category) override,
//! then seller override, then the platform default. The computed amount is
//! frozen onto each order line at creation; a later rate change never
//! touches historical orders.

use std::collections::HashMap;

use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::money::{percent_of, round_money};
use crate::orders::{OrderError, OrderResult};

pub struct CommissionCalculator {
    default_rate: Decimal,
    seller_rates: RwLock<HashMap<String, Decimal>>,
    category_rates: RwLock<HashMap<(String, String), Decimal>>,
}

impl CommissionCalculator {
    pub fn new(default_rate: Decimal) -> Self {
        Self {
            default_rate,
            seller_rates: RwLock::new(HashMap::new()),
            category_rates: RwLock::new(HashMap::new()),
        }
    }

    pub fn set_seller_rate(&self, seller_id: &str, rate: Decimal) -> OrderResult<()> {
        validate_rate(rate)?;
        self.seller_rates
            .write()
            .insert(seller_id.to_string(), rate);
        Ok(())
    }

    pub fn set_category_rate(
        &self,
        seller_id: &str,
        category: &str,
        rate: Decimal,
    ) -> OrderResult<()> {
        validate_rate(rate)?;
        self.category_rates
            .write()
            .insert((seller_id.to_string(), category.to_string()), rate);
        Ok(())
    }

    /// Effective rate for one line
    pub fn rate_for(&self, seller_id: &str, category: Option<&str>) -> Decimal {
        if let Some(category) = category
            && let Some(rate) = self
                .category_rates
                .read()
                .get(&(seller_id.to_string(), category.to_string()))
        {
            return *rate;
        }
        if let Some(rate) = self.seller_rates.read().get(seller_id) {
            return *rate;
        }
        self.default_rate
    }

    /// Commission for one line: `unit_price * quantity * rate%`, rounded
    /// half away from zero to the minor unit
    pub fn line_commission(
        &self,
        seller_id: &str,
        category: Option<&str>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Decimal {
        let rate = self.rate_for(seller_id, category);
        let gross = unit_price * Decimal::from(quantity);
        round_money(percent_of(gross, rate))
    }
}

fn validate_rate(rate: Decimal) -> OrderResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(OrderError::Validation(format!(
            "commission rate must be in [0, 100], got {}",
            rate
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
    fn default_rate_is_exact() {
        let calc = CommissionCalculator::new(dec("8.25"));
        // 8.25% of 500.00 is exactly 41.25
        assert_eq!(
            calc.line_commission("seller-1", None, dec("500.00"), 1),
            dec("41.25")
        );
    }

    #[test]
    fn lookup_precedence() {
        let calc = CommissionCalculator::new(dec("8.25"));
        calc.set_seller_rate("seller-1", dec("5")).unwrap();
        calc.set_category_rate("seller-1", "electronics", dec("12"))
            .unwrap();

        assert_eq!(calc.rate_for("seller-1", Some("electronics")), dec("12"));
        assert_eq!(calc.rate_for("seller-1", Some("books")), dec("5"));
        assert_eq!(calc.rate_for("seller-1", None), dec("5"));
        assert_eq!(calc.rate_for("seller-2", Some("electronics")), dec("8.25"));
    }

    #[test]
    fn rounding_half_away_from_zero() {
        let calc = CommissionCalculator::new(dec("8.25"));
        // 8.25% of 10.10 = 0.83325 -> 0.83
        assert_eq!(
            calc.line_commission("seller-1", None, dec("10.10"), 1),
            dec("0.83")
        );
        // 8.25% of 30.00 = 2.475 -> 2.48 (midpoint away from zero)
        assert_eq!(
            calc.line_commission("seller-1", None, dec("30.00"), 1),
            dec("2.48")
        );
    }

    #[test]
    fn quantity_multiplies_before_rounding() {
        let calc = CommissionCalculator::new(dec("8.25"));
        // 3 * 10.10 = 30.30; 8.25% = 2.49975 -> 2.50
        assert_eq!(
            calc.line_commission("seller-1", None, dec("10.10"), 3),
            dec("2.50")
        );
    }

    #[test]
    fn invalid_rates_rejected() {
        let calc = CommissionCalculator::new(dec("8.25"));
        assert!(calc.set_seller_rate("seller-1", dec("-1")).is_err());
        assert!(calc.set_seller_rate("seller-1", dec("101")).is_err());
    }
}
