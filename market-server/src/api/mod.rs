//! API routes
//!
//! One module per resource, each with a `router()` nesting under its
//! `/api/...` prefix and a `handler` submodule with the axum handlers.
//!
//! - [`health`] - liveness probe
//! - [`orders`] - checkout, lifecycle transitions, dispatch
//! - [`payments`] - cash recording and ledger reads
//! - [`coupons`] - coupon administration and statistics
//! - [`staff`] - staff directory and payroll runs
//! - [`drivers`] - driver registry

pub mod coupons;
pub mod drivers;
pub mod health;
pub mod orders;
pub mod payments;
pub mod staff;

use std::time::Duration;

use axum::Router;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

pub fn create_router(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(coupons::router())
        .merge(staff::router())
        .merge(drivers::router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
