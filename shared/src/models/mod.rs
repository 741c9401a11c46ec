//! Domain models shared across the workspace

pub mod coupon;
pub mod driver;
pub mod order;
pub mod payroll;
pub mod staff;
