//! Staff and payroll API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use shared::{PayrollRun, ProcessPayrollRequest, Staff, StaffCreate, StaffUpdate};

use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

const RESOURCE: &str = "staff";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerFilter {
    pub seller_id: Option<String>,
}

/// POST /api/staff
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<StaffCreate>,
) -> AppResult<Json<AppResponse<Staff>>> {
    let staff = state.payroll.create_staff(payload)?;
    state.broadcast_sync(RESOURCE, "created", &staff.id, Some(&staff));
    Ok(ok(staff))
}

/// GET /api/staff?sellerId=...
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<SellerFilter>,
) -> AppResult<Json<AppResponse<Vec<Staff>>>> {
    Ok(ok(state.payroll.list_staff(filter.seller_id.as_deref())))
}

/// GET /api/staff/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Staff>>> {
    Ok(ok(state.payroll.get_staff(&id)?))
}

/// PUT /api/staff/{id} - partial update
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StaffUpdate>,
) -> AppResult<Json<AppResponse<Staff>>> {
    let staff = state.payroll.update_staff(&id, payload)?;
    state.broadcast_sync(RESOURCE, "updated", &staff.id, Some(&staff));
    Ok(ok(staff))
}

/// POST /api/staff/payroll/process - compute and commit a payroll run
pub async fn process_payroll(
    State(state): State<ServerState>,
    Json(payload): Json<ProcessPayrollRequest>,
) -> AppResult<Json<AppResponse<PayrollRun>>> {
    let run = state.payroll.process_run(payload, Utc::now())?;
    state.broadcast_sync("payroll_run", "created", &run.id, Some(&run));
    Ok(ok(run))
}

/// GET /api/staff/payroll/runs?sellerId=...
pub async fn list_runs(
    State(state): State<ServerState>,
    Query(filter): Query<SellerFilter>,
) -> AppResult<Json<AppResponse<Vec<PayrollRun>>>> {
    Ok(ok(state.payroll.list_runs(filter.seller_id.as_deref())))
}

/// GET /api/staff/payroll/runs/{id}
pub async fn get_run(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<PayrollRun>>> {
    Ok(ok(state.payroll.get_run(&id)?))
}
