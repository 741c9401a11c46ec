//! Coupon model and usage log

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A discount code redeemable against matching orders, subject to usage limits
///
/// Codes are generated server-side, never buyer-chosen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: String,
    pub code: String,
    /// Percentage discount, 0–100
    pub discount_value: Decimal,
    /// Empty = applies to any product
    #[serde(default)]
    pub applicable_products: Vec<String>,
    pub minimum_order_amount: Decimal,
    /// Caps the absolute discount; None = uncapped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_discount: Option<Decimal>,
    /// Global redemption cap; None = unlimited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    /// Per-buyer redemption cap; None = unlimited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_usage_limit: Option<u32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Append-only redemption log entry
///
/// Enforces usage limits and backs audit/statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CouponUsage {
    pub coupon_id: String,
    pub code: String,
    pub order_id: String,
    pub buyer_id: String,
    pub discount_amount: Decimal,
    pub used_at: DateTime<Utc>,
}

/// Aggregate usage figures for one coupon code
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponCodeStats {
    pub code: String,
    pub redemptions: u64,
    pub discount_granted: Decimal,
}

/// Platform-wide coupon statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponStats {
    pub total_coupons: u64,
    pub active_coupons: u64,
    pub total_redemptions: u64,
    pub total_discount_granted: Decimal,
    pub by_code: Vec<CouponCodeStats>,
}
