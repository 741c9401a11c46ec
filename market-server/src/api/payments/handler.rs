//! Payment API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Serialize;
use shared::{Order, PaymentRecord, PaymentSummary, RecordCashRequest};

use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

/// POST /api/payments/record-cash response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCashResponse {
    pub record: PaymentRecord,
    pub summary: PaymentSummary,
    pub order: Order,
}

/// GET /api/payments/{order_id} response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerResponse {
    pub records: Vec<PaymentRecord>,
    pub summary: PaymentSummary,
}

/// POST /api/payments/record-cash - append a cash payment
pub async fn record_cash(
    State(state): State<ServerState>,
    Json(payload): Json<RecordCashRequest>,
) -> AppResult<Json<AppResponse<RecordCashResponse>>> {
    let (record, summary, order) = state.orders.record_cash_payment(payload, Utc::now())?;
    state.broadcast_sync("order", "updated", &order.id, Some(&order));
    Ok(ok(RecordCashResponse {
        record,
        summary,
        order,
    }))
}

/// GET /api/payments/{order_id} - ledger entries and reconciliation summary
pub async fn ledger(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<AppResponse<LedgerResponse>>> {
    let records = state.orders.payment_records(&order_id)?;
    let summary = state.orders.payment_summary(&order_id)?;
    Ok(ok(LedgerResponse { records, summary }))
}
