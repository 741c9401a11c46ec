//! Coupon lifecycle and redemption

mod engine;

pub use engine::{CouponEngine, CouponError};
