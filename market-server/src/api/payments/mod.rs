//! Payment API module

pub(crate) mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/record-cash", post(handler::record_cash))
        .route("/{order_id}", get(handler::ledger))
}
