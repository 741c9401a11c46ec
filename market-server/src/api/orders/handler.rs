//! Order API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use shared::{
    CreateOrderRequest, DispatchRequest, FulfillmentRequest, Order, OrderStatus, Paginated,
    StatusChangeRequest,
};

use crate::core::ServerState;
use crate::orders::{OrderDetail, OrderQuery};
use crate::utils::{AppResponse, AppResult, ok};

const RESOURCE: &str = "order";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub buyer_id: Option<String>,
    pub seller_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// POST /api/orders - checkout
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.orders.create_order(payload, Utc::now())?;
    state.broadcast_sync(RESOURCE, "created", &order.id, Some(&order));
    Ok(ok(order))
}

/// GET /api/orders - filtered, paginated listing
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Paginated<Order>>>> {
    let page = state.orders.list_orders(&OrderQuery {
        status: query.status,
        buyer_id: query.buyer_id,
        seller_id: query.seller_id,
        page: query.page,
        limit: query.limit,
    });
    Ok(ok(page))
}

/// GET /api/orders/{id} - order with payment summary and allowed actions
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let detail = state.orders.order_detail(&id)?;
    Ok(ok(detail))
}

/// PATCH /api/orders/{id}/status - lifecycle transition
pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusChangeRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.orders.change_status(&id, payload, Utc::now())?;
    state.broadcast_sync(RESOURCE, "updated", &order.id, Some(&order));
    Ok(ok(order))
}

/// PATCH /api/orders/{id}/fulfillment - delivery-side milestones
pub async fn fulfillment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<FulfillmentRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.orders.fulfillment(&id, payload, Utc::now())?;
    state.broadcast_sync(RESOURCE, "updated", &order.id, Some(&order));
    Ok(ok(order))
}

/// POST /api/orders/{id}/dispatch - assign a driver and ship
pub async fn dispatch(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DispatchRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let driver_id = payload.driver_id.clone();
    let order = state.orders.dispatch(&id, payload, Utc::now())?;
    state.broadcast_sync(RESOURCE, "updated", &order.id, Some(&order));
    if let Ok(driver) = state.drivers.get(&driver_id) {
        state.broadcast_sync("driver", "updated", &driver.id, Some(&driver));
    }
    Ok(ok(order))
}
