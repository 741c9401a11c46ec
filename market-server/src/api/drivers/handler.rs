//! Driver API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::{Driver, DriverCreate, DriverStatus};

use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

const RESOURCE: &str = "driver";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: DriverStatus,
}

/// POST /api/drivers
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DriverCreate>,
) -> AppResult<Json<AppResponse<Driver>>> {
    let driver = state.drivers.create(payload)?;
    state.broadcast_sync(RESOURCE, "created", &driver.id, Some(&driver));
    Ok(ok(driver))
}

/// GET /api/drivers
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Driver>>>> {
    Ok(ok(state.drivers.list()))
}

/// GET /api/drivers/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Driver>>> {
    Ok(ok(state.drivers.get(&id)?))
}

/// PATCH /api/drivers/{id}/status - manual availability override
pub async fn set_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<AppResponse<Driver>>> {
    let driver = state.drivers.set_status(&id, payload.status)?;
    state.broadcast_sync(RESOURCE, "updated", &driver.id, Some(&driver));
    Ok(ok(driver))
}
