//! Staff and payroll API module

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/staff", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/payroll/process", post(handler::process_payroll))
        .route("/payroll/runs", get(handler::list_runs))
        .route("/payroll/runs/{id}", get(handler::get_run))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}", put(handler::update))
}
