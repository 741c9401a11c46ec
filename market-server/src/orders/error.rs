//! Order engine error taxonomy
//!
//! Every variant carries enough structure for the caller to render a
//! specific message. The engine never retries on its own.

use rust_decimal::Decimal;
use shared::OrderStatus;

use crate::coupons::CouponError;

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The requested transition is not in the legal table
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Recording this payment would push the ledger past the order total
    #[error("payment of {attempted} exceeds remaining balance {remaining}")]
    Overpayment {
        attempted: Decimal,
        remaining: Decimal,
    },

    /// Driver is not AVAILABLE at dispatch time
    #[error("driver {0} is not available")]
    DriverUnavailable(String),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Missing or malformed input (e.g. empty rejection reason)
    #[error("validation failed: {0}")]
    Validation(String),

    /// Lost the per-order race to a concurrent mutation
    #[error("concurrent modification of order {0}")]
    ConcurrencyConflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Actor is not authorized for this transition
    #[error("permission denied: {0}")]
    Forbidden(String),
}

pub type OrderResult<T> = Result<T, OrderError>;
