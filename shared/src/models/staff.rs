//! Staff model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    Operations,
    Warehouse,
    Delivery,
    Support,
    Finance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Manager,
    Supervisor,
    Associate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffStatus {
    #[default]
    Active,
    Suspended,
    Terminated,
}

/// A staff member employed by one seller
///
/// At least one of `salary` / `hourly_rate` is set; enforced at
/// create/update time. Payroll pays the salary when both are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: String,
    pub seller_id: String,
    pub name: String,
    pub department: Department,
    pub role: StaffRole,
    pub status: StaffStatus,
    /// Monthly salary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}
