//! Coupon API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::{Coupon, CouponCreate, CouponStats, CouponUpdate};

use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

const RESOURCE: &str = "coupon";

/// POST /api/coupons - create with a server-generated code
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CouponCreate>,
) -> AppResult<Json<AppResponse<Coupon>>> {
    let coupon = state.coupons.create(payload)?;
    state.broadcast_sync(RESOURCE, "created", &coupon.id, Some(&coupon));
    Ok(ok(coupon))
}

/// GET /api/coupons - all coupons, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Coupon>>>> {
    Ok(ok(state.coupons.list()))
}

/// GET /api/coupons/stats - platform-wide redemption statistics
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<AppResponse<CouponStats>>> {
    Ok(ok(state.coupons.stats()))
}

/// GET /api/coupons/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Coupon>>> {
    Ok(ok(state.coupons.get(&id)?))
}

/// PUT /api/coupons/{id} - partial update
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CouponUpdate>,
) -> AppResult<Json<AppResponse<Coupon>>> {
    let coupon = state.coupons.update(&id, payload)?;
    state.broadcast_sync(RESOURCE, "updated", &coupon.id, Some(&coupon));
    Ok(ok(coupon))
}

/// DELETE /api/coupons/{id} - deactivate; the usage log is kept
pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Coupon>>> {
    let coupon = state.coupons.deactivate(&id)?;
    state.broadcast_sync(RESOURCE, "updated", &coupon.id, Some(&coupon));
    Ok(ok(coupon))
}
