//! Shared types for the marketplace engine
//!
//! Wire contract used by the server and any in-process consumer:
//! domain models, status enums, request/response DTOs and the
//! sync payload broadcast after mutations.

pub mod dto;
pub mod models;
pub mod sync;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use dto::{
    Actor, CouponCreate, CouponUpdate, CreateOrderRequest, DispatchRequest, DriverCreate,
    FulfillmentRequest, OrderItemInput, Paginated, PaymentTiming, ProcessPayrollRequest,
    RecordCashRequest, StaffCreate, StaffHours, StaffUpdate, StatusChangeRequest,
};
pub use models::coupon::{Coupon, CouponCodeStats, CouponStats, CouponUsage};
pub use models::driver::{Driver, DriverStatus};
pub use models::order::{
    Order, OrderAction, OrderItem, OrderStatus, PaymentRecord, PaymentStatus, PaymentSummary,
    RecordedBy, ShippingAddress,
};
pub use models::payroll::{PayrollPeriod, PayrollRun, PayrollStatus, Payslip};
pub use models::staff::{Department, Staff, StaffRole, StaffStatus};
pub use sync::SyncPayload;
