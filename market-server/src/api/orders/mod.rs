//! Order API module

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/payment", get(super::payments::handler::ledger))
        .route("/{id}/status", patch(handler::change_status))
        .route("/{id}/fulfillment", patch(handler::fulfillment))
        .route("/{id}/dispatch", post(handler::dispatch))
}
