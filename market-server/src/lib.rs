//! Marketplace order lifecycle and payment reconciliation engine
//!
//! Module map:
//! - [`core`] - configuration, shared state, server lifecycle
//! - [`api`] - REST surface
//! - [`orders`] - state machine, ledger, dispatch, storage, manager
//! - [`pricing`] - commission and shipping
//! - [`coupons`] - coupon engine
//! - [`payroll`] - staff directory and payroll runs
//! - [`money`] - decimal arithmetic helpers
//! - [`utils`] - errors, logging

pub mod api;
pub mod core;
pub mod coupons;
pub mod money;
pub mod orders;
pub mod payroll;
pub mod pricing;
pub mod utils;
