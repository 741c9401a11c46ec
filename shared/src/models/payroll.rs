//! Payroll run and payslip models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollPeriod {
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollStatus {
    Pending,
    Processed,
}

/// A single staff member's computed pay for one payroll period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payslip {
    pub staff_id: String,
    pub staff_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_worked: Option<Decimal>,
    pub net_pay: Decimal,
}

/// One payroll run for a seller over a period
///
/// Once `Processed`, the run is immutable; history is append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRun {
    pub id: String,
    pub seller_id: String,
    pub period: PayrollPeriod,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub payslips: Vec<Payslip>,
    pub status: PayrollStatus,
    /// Sum of payslip net pay
    pub total_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}
