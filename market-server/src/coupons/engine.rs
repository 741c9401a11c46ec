//! Coupon engine
//!
//! All coupon state lives behind a single mutex so a redemption is one
//! atomic validate-then-log step. Usage limits hold under concurrent
//! checkouts because the count check and the usage append happen under
//! the same lock.
//!
//! Redemption is the last fallible step of checkout: the caller validates
//! everything else about the order first, redeems, then commits. A coupon
//! failure therefore never leaves a half-created order, and an order
//! failure never burns a redemption.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::{Coupon, CouponCodeStats, CouponCreate, CouponStats, CouponUpdate, CouponUsage};
use uuid::Uuid;

use crate::money::{floor_minor_unit, percent_of};

#[derive(Debug, thiserror::Error)]
pub enum CouponError {
    /// Unknown or deactivated code; the two are not distinguishable to
    /// callers, so a dead code leaks nothing about past campaigns
    #[error("coupon code {0} not found")]
    NotFound(String),

    /// Outside the [valid_from, valid_until] window
    #[error("coupon {0} is not valid at this time")]
    Expired(String),

    #[error("order subtotal {subtotal} is below the coupon minimum {minimum}")]
    BelowMinimum { minimum: Decimal, subtotal: Decimal },

    #[error("coupon {0} does not apply to any product in this order")]
    NotApplicable(String),

    #[error("coupon {0} has reached its redemption limit")]
    UsageLimitExceeded(String),

    #[error("buyer has reached the per-buyer limit for coupon {0}")]
    BuyerLimitExceeded(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub type CouponResult<T> = Result<T, CouponError>;

#[derive(Default)]
struct CouponState {
    /// By coupon id
    coupons: HashMap<String, Coupon>,
    /// code -> id
    by_code: HashMap<String, String>,
    /// Append-only redemption log
    usages: Vec<CouponUsage>,
}

pub struct CouponEngine {
    state: Mutex<CouponState>,
}

impl Default for CouponEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CouponEngine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CouponState::default()),
        }
    }

    /// Create a coupon with a server-generated code
    pub fn create(&self, req: CouponCreate) -> CouponResult<Coupon> {
        if req.discount_value <= Decimal::ZERO || req.discount_value > Decimal::ONE_HUNDRED {
            return Err(CouponError::Validation(format!(
                "discount value must be in (0, 100], got {}",
                req.discount_value
            )));
        }
        if req.minimum_order_amount < Decimal::ZERO {
            return Err(CouponError::Validation(
                "minimum order amount must be non-negative".to_string(),
            ));
        }
        if let Some(max) = req.maximum_discount
            && max <= Decimal::ZERO
        {
            return Err(CouponError::Validation(
                "maximum discount must be positive".to_string(),
            ));
        }
        if req.valid_until <= req.valid_from {
            return Err(CouponError::Validation(
                "validity window must end after it starts".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let code = generate_code();
        let coupon = Coupon {
            id: id.clone(),
            code: code.clone(),
            discount_value: req.discount_value,
            applicable_products: req.applicable_products,
            minimum_order_amount: req.minimum_order_amount,
            maximum_discount: req.maximum_discount,
            usage_limit: req.usage_limit,
            user_usage_limit: req.user_usage_limit,
            valid_from: req.valid_from,
            valid_until: req.valid_until,
            is_active: true,
            created_at: Utc::now(),
        };

        let mut state = self.state.lock();
        state.by_code.insert(code, id.clone());
        state.coupons.insert(id, coupon.clone());
        Ok(coupon)
    }

    pub fn update(&self, id: &str, req: CouponUpdate) -> CouponResult<Coupon> {
        let mut state = self.state.lock();
        let coupon = state
            .coupons
            .get_mut(id)
            .ok_or_else(|| CouponError::NotFound(id.to_string()))?;

        if let Some(v) = req.discount_value {
            if v <= Decimal::ZERO || v > Decimal::ONE_HUNDRED {
                return Err(CouponError::Validation(format!(
                    "discount value must be in (0, 100], got {}",
                    v
                )));
            }
            coupon.discount_value = v;
        }
        if let Some(products) = req.applicable_products {
            coupon.applicable_products = products;
        }
        if let Some(min) = req.minimum_order_amount {
            coupon.minimum_order_amount = min;
        }
        if let Some(max) = req.maximum_discount {
            coupon.maximum_discount = Some(max);
        }
        if let Some(limit) = req.usage_limit {
            coupon.usage_limit = Some(limit);
        }
        if let Some(limit) = req.user_usage_limit {
            coupon.user_usage_limit = Some(limit);
        }
        if let Some(from) = req.valid_from {
            coupon.valid_from = from;
        }
        if let Some(until) = req.valid_until {
            coupon.valid_until = until;
        }
        if let Some(active) = req.is_active {
            coupon.is_active = active;
        }
        if coupon.valid_until <= coupon.valid_from {
            return Err(CouponError::Validation(
                "validity window must end after it starts".to_string(),
            ));
        }
        Ok(coupon.clone())
    }

    /// Deactivate rather than remove; the usage log must keep resolving
    pub fn deactivate(&self, id: &str) -> CouponResult<Coupon> {
        let mut state = self.state.lock();
        let coupon = state
            .coupons
            .get_mut(id)
            .ok_or_else(|| CouponError::NotFound(id.to_string()))?;
        coupon.is_active = false;
        Ok(coupon.clone())
    }

    pub fn get(&self, id: &str) -> CouponResult<Coupon> {
        self.state
            .lock()
            .coupons
            .get(id)
            .cloned()
            .ok_or_else(|| CouponError::NotFound(id.to_string()))
    }

    pub fn list(&self) -> Vec<Coupon> {
        let mut coupons: Vec<Coupon> = self.state.lock().coupons.values().cloned().collect();
        coupons.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        coupons
    }

    /// Validate a code against an order without consuming a redemption
    pub fn quote(
        &self,
        code: &str,
        buyer_id: &str,
        subtotal: Decimal,
        product_ids: &[String],
        now: DateTime<Utc>,
    ) -> CouponResult<Decimal> {
        let state = self.state.lock();
        let coupon = resolve(&state, code)?;
        validate(&state, coupon, buyer_id, subtotal, product_ids, now)?;
        Ok(discount_for(coupon, subtotal))
    }

    /// Atomically validate and consume one redemption
    ///
    /// On success the usage is logged immediately; there is no window in
    /// which a concurrent redeem of the same code sees a stale count.
    pub fn redeem(
        &self,
        code: &str,
        buyer_id: &str,
        order_id: &str,
        subtotal: Decimal,
        product_ids: &[String],
        now: DateTime<Utc>,
    ) -> CouponResult<Decimal> {
        let mut state = self.state.lock();
        let coupon = resolve(&state, code)?;
        validate(&state, coupon, buyer_id, subtotal, product_ids, now)?;
        let discount = discount_for(coupon, subtotal);

        let usage = CouponUsage {
            coupon_id: coupon.id.clone(),
            code: coupon.code.clone(),
            order_id: order_id.to_string(),
            buyer_id: buyer_id.to_string(),
            discount_amount: discount,
            used_at: now,
        };
        state.usages.push(usage);
        Ok(discount)
    }

    pub fn stats(&self) -> CouponStats {
        let state = self.state.lock();
        let mut by_code: HashMap<String, CouponCodeStats> = HashMap::new();
        for usage in &state.usages {
            let entry = by_code
                .entry(usage.code.clone())
                .or_insert_with(|| CouponCodeStats {
                    code: usage.code.clone(),
                    redemptions: 0,
                    discount_granted: Decimal::ZERO,
                });
            entry.redemptions += 1;
            entry.discount_granted += usage.discount_amount;
        }
        let mut by_code: Vec<CouponCodeStats> = by_code.into_values().collect();
        by_code.sort_by(|a, b| a.code.cmp(&b.code));

        CouponStats {
            total_coupons: state.coupons.len() as u64,
            active_coupons: state.coupons.values().filter(|c| c.is_active).count() as u64,
            total_redemptions: state.usages.len() as u64,
            total_discount_granted: state.usages.iter().map(|u| u.discount_amount).sum(),
            by_code,
        }
    }
}

fn generate_code() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("CPN-{}", raw[..8].to_uppercase())
}

fn resolve<'a>(state: &'a CouponState, code: &str) -> CouponResult<&'a Coupon> {
    let id = state
        .by_code
        .get(code)
        .ok_or_else(|| CouponError::NotFound(code.to_string()))?;
    state
        .coupons
        .get(id)
        .ok_or_else(|| CouponError::NotFound(code.to_string()))
}

/// Rejection checks, in a fixed order so failures are deterministic
fn validate(
    state: &CouponState,
    coupon: &Coupon,
    buyer_id: &str,
    subtotal: Decimal,
    product_ids: &[String],
    now: DateTime<Utc>,
) -> CouponResult<()> {
    if !coupon.is_active {
        return Err(CouponError::NotFound(coupon.code.clone()));
    }
    if now < coupon.valid_from || now > coupon.valid_until {
        return Err(CouponError::Expired(coupon.code.clone()));
    }
    if subtotal < coupon.minimum_order_amount {
        return Err(CouponError::BelowMinimum {
            minimum: coupon.minimum_order_amount,
            subtotal,
        });
    }
    if !coupon.applicable_products.is_empty()
        && !product_ids
            .iter()
            .any(|p| coupon.applicable_products.contains(p))
    {
        return Err(CouponError::NotApplicable(coupon.code.clone()));
    }
    if let Some(limit) = coupon.usage_limit {
        let used = state
            .usages
            .iter()
            .filter(|u| u.coupon_id == coupon.id)
            .count();
        if used as u32 >= limit {
            return Err(CouponError::UsageLimitExceeded(coupon.code.clone()));
        }
    }
    if let Some(limit) = coupon.user_usage_limit {
        let used = state
            .usages
            .iter()
            .filter(|u| u.coupon_id == coupon.id && u.buyer_id == buyer_id)
            .count();
        if used as u32 >= limit {
            return Err(CouponError::BuyerLimitExceeded(coupon.code.clone()));
        }
    }
    Ok(())
}

/// Percentage of subtotal, capped, rounded down to the minor unit
fn discount_for(coupon: &Coupon, subtotal: Decimal) -> Decimal {
    let mut discount = percent_of(subtotal, coupon.discount_value);
    if let Some(cap) = coupon.maximum_discount
        && discount > cap
    {
        discount = cap;
    }
    if discount > subtotal {
        discount = subtotal;
    }
    floor_minor_unit(discount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn engine_with(req: CouponCreate) -> (CouponEngine, Coupon) {
        let engine = CouponEngine::new();
        let coupon = engine.create(req).unwrap();
        (engine, coupon)
    }

    fn base_create() -> CouponCreate {
        CouponCreate {
            discount_value: dec("10"),
            applicable_products: vec![],
            minimum_order_amount: Decimal::ZERO,
            maximum_discount: None,
            usage_limit: None,
            user_usage_limit: None,
            valid_from: Utc::now() - Duration::days(1),
            valid_until: Utc::now() + Duration::days(30),
        }
    }

    #[test]
    fn create_generates_code_and_rejects_bad_values() {
        let engine = CouponEngine::new();
        let coupon = engine.create(base_create()).unwrap();
        assert!(coupon.code.starts_with("CPN-"));
        assert!(coupon.is_active);

        let mut bad = base_create();
        bad.discount_value = dec("0");
        assert!(matches!(
            engine.create(bad),
            Err(CouponError::Validation(_))
        ));

        let mut bad = base_create();
        bad.discount_value = dec("101");
        assert!(engine.create(bad).is_err());
    }

    #[test]
    fn discount_is_capped_and_floored() {
        let mut req = base_create();
        req.discount_value = dec("25");
        req.maximum_discount = Some(dec("50"));
        let (engine, coupon) = engine_with(req);

        // 25% of 400 = 100, capped at 50
        let discount = engine
            .quote(&coupon.code, "buyer-1", dec("400"), &[], Utc::now())
            .unwrap();
        assert_eq!(discount, dec("50"));

        // 25% of 133.33 = 33.3325, floored to 33.33
        let discount = engine
            .quote(&coupon.code, "buyer-1", dec("133.33"), &[], Utc::now())
            .unwrap();
        assert_eq!(discount, dec("33.33"));
    }

    #[test]
    fn minimum_order_amount_enforced() {
        let mut req = base_create();
        req.minimum_order_amount = dec("100");
        let (engine, coupon) = engine_with(req);

        let result = engine.quote(&coupon.code, "buyer-1", dec("99.99"), &[], Utc::now());
        assert!(matches!(result, Err(CouponError::BelowMinimum { .. })));

        assert!(engine
            .quote(&coupon.code, "buyer-1", dec("100"), &[], Utc::now())
            .is_ok());
    }

    #[test]
    fn product_scoping() {
        let mut req = base_create();
        req.applicable_products = vec!["prod-a".to_string()];
        let (engine, coupon) = engine_with(req);

        let result = engine.quote(
            &coupon.code,
            "buyer-1",
            dec("50"),
            &["prod-b".to_string()],
            Utc::now(),
        );
        assert!(matches!(result, Err(CouponError::NotApplicable(_))));

        assert!(engine
            .quote(
                &coupon.code,
                "buyer-1",
                dec("50"),
                &["prod-b".to_string(), "prod-a".to_string()],
                Utc::now(),
            )
            .is_ok());
    }

    #[test]
    fn validity_window_enforced() {
        let mut req = base_create();
        req.valid_from = Utc::now() + Duration::days(1);
        let (engine, coupon) = engine_with(req);
        let result = engine.quote(&coupon.code, "buyer-1", dec("50"), &[], Utc::now());
        assert!(matches!(result, Err(CouponError::Expired(_))));
    }

    #[test]
    fn usage_limits_consume_on_redeem_not_quote() {
        let mut req = base_create();
        req.usage_limit = Some(1);
        let (engine, coupon) = engine_with(req);

        // Quotes never consume
        for _ in 0..3 {
            engine
                .quote(&coupon.code, "buyer-1", dec("50"), &[], Utc::now())
                .unwrap();
        }

        engine
            .redeem(&coupon.code, "buyer-1", "order-1", dec("50"), &[], Utc::now())
            .unwrap();
        let result = engine.redeem(
            &coupon.code,
            "buyer-2",
            "order-2",
            dec("50"),
            &[],
            Utc::now(),
        );
        assert!(matches!(result, Err(CouponError::UsageLimitExceeded(_))));
    }

    #[test]
    fn per_buyer_limit() {
        let mut req = base_create();
        req.user_usage_limit = Some(1);
        let (engine, coupon) = engine_with(req);

        engine
            .redeem(&coupon.code, "buyer-1", "order-1", dec("50"), &[], Utc::now())
            .unwrap();
        let result = engine.redeem(
            &coupon.code,
            "buyer-1",
            "order-2",
            dec("50"),
            &[],
            Utc::now(),
        );
        assert!(matches!(result, Err(CouponError::BuyerLimitExceeded(_))));

        // A different buyer is unaffected
        assert!(engine
            .redeem(&coupon.code, "buyer-2", "order-3", dec("50"), &[], Utc::now())
            .is_ok());
    }

    #[test]
    fn deactivated_coupon_reads_as_unknown() {
        let (engine, coupon) = engine_with(base_create());
        engine.deactivate(&coupon.id).unwrap();
        let result = engine.quote(&coupon.code, "buyer-1", dec("50"), &[], Utc::now());
        assert!(matches!(result, Err(CouponError::NotFound(_))));
    }

    #[test]
    fn stats_aggregate_redemptions() {
        let (engine, coupon) = engine_with(base_create());
        engine
            .redeem(&coupon.code, "buyer-1", "order-1", dec("100"), &[], Utc::now())
            .unwrap();
        engine
            .redeem(&coupon.code, "buyer-2", "order-2", dec("200"), &[], Utc::now())
            .unwrap();

        let stats = engine.stats();
        assert_eq!(stats.total_coupons, 1);
        assert_eq!(stats.active_coupons, 1);
        assert_eq!(stats.total_redemptions, 2);
        assert_eq!(stats.total_discount_granted, dec("30.00"));
        assert_eq!(stats.by_code.len(), 1);
        assert_eq!(stats.by_code[0].redemptions, 2);
    }
}
