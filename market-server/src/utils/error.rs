//! Unified error handling
//!
//! Application-level error type and the response envelope every handler
//! returns.
//!
//! # Error code scheme
//!
//! | Code  | Meaning                    | HTTP |
//! |-------|----------------------------|------|
//! | E0000 | Success                    | 200  |
//! | E0002 | Validation failed          | 400  |
//! | E0003 | Resource not found         | 404  |
//! | E0004 | Resource conflict          | 409  |
//! | E0005 | Business rule violation    | 422  |
//! | E0006 | Invalid request            | 400  |
//! | E1001 | Invalid state transition   | 409  |
//! | E1002 | Overpayment rejected       | 422  |
//! | E1003 | Driver unavailable         | 409  |
//! | E1004 | Coupon rejected            | 422  |
//! | E1005 | Lost a concurrent update   | 409  |
//! | E2001 | Permission denied          | 403  |
//! | E9001 | Internal server error      | 500  |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::coupons::CouponError;
use crate::orders::OrderError;
use crate::payroll::PayrollError;

/// API response envelope
///
/// ```json
/// { "code": "E0000", "message": "Success", "data": { ... } }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Generic (4xx) ==========
    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    // ========== Engine errors (4xx, specific codes) ==========
    #[error("Invalid transition: {0}")]
    Transition(String),

    #[error("Overpayment: {0}")]
    Overpayment(String),

    #[error("Driver unavailable: {0}")]
    DriverUnavailable(String),

    #[error("Coupon rejected: {0}")]
    Coupon(String),

    #[error("Concurrency conflict: {0}")]
    Concurrency(String),

    // ========== System errors (5xx) ==========
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),
            AppError::BusinessRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E0005", msg.clone())
            }
            AppError::Invalid(msg) => (StatusCode::BAD_REQUEST, "E0006", msg.clone()),

            AppError::Transition(msg) => (StatusCode::CONFLICT, "E1001", msg.clone()),
            AppError::Overpayment(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "E1002", msg.clone()),
            AppError::DriverUnavailable(msg) => (StatusCode::CONFLICT, "E1003", msg.clone()),
            AppError::Coupon(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "E1004", msg.clone()),
            AppError::Concurrency(msg) => (StatusCode::CONFLICT, "E1005", msg.clone()),

            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::InvalidTransition { .. } => AppError::Transition(e.to_string()),
            OrderError::Overpayment { .. } => AppError::Overpayment(e.to_string()),
            OrderError::DriverUnavailable(_) => AppError::DriverUnavailable(e.to_string()),
            OrderError::Coupon(c) => c.into(),
            OrderError::Validation(msg) => AppError::Validation(msg),
            OrderError::ConcurrencyConflict(_) => AppError::Concurrency(e.to_string()),
            OrderError::NotFound(_) => AppError::NotFound(e.to_string()),
            OrderError::Forbidden(msg) => AppError::Forbidden(msg),
        }
    }
}

impl From<CouponError> for AppError {
    fn from(e: CouponError) -> Self {
        match e {
            CouponError::Validation(msg) => AppError::Validation(msg),
            CouponError::NotFound(_) => AppError::NotFound(e.to_string()),
            other => AppError::Coupon(other.to_string()),
        }
    }
}

impl From<PayrollError> for AppError {
    fn from(e: PayrollError) -> Self {
        match e {
            PayrollError::NotFound(msg) => AppError::NotFound(msg),
            PayrollError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: message.into(),
        data: Some(data),
    })
}
