//! Request/response DTOs for the REST contract
//!
//! Mutations carry an explicit [`Actor`] so the engine can authorize
//! transitions without reaching into any transport-layer session state.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::order::OrderStatus;
use crate::models::payroll::PayrollPeriod;
use crate::models::staff::{Department, StaffRole, StaffStatus};

/// Who is performing a mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    Buyer { id: String },
    Seller { id: String },
    Admin,
    System,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Admin)
    }
}

/// Selects the initial lifecycle state at order creation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTiming {
    /// Immediate payment: order starts at AWAITING_SELLER_ACCEPTANCE
    #[default]
    PayNow,
    /// Cash / delayed payment: order starts at PENDING_PAYMENT
    PayOnDelivery,
}

/// One line of a checkout submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: String,
    pub seller_sku: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub unit_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_price: Option<Decimal>,
    pub quantity: u32,
}

/// `POST /api/orders` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub buyer_id: String,
    pub seller_id: String,
    pub items: Vec<OrderItemInput>,
    pub shipping_address: crate::models::order::ShippingAddress,
    #[serde(default)]
    pub payment_timing: PaymentTiming,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// `PATCH /api/orders/{id}/status` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub actor: Actor,
}

/// `PATCH /api/orders/{id}/fulfillment` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRequest {
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub actor: Actor,
}

/// `POST /api/orders/{id}/dispatch` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    pub driver_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch_notes: Option<String>,
    pub actor: Actor,
}

/// `POST /api/payments/record-cash` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCashRequest {
    pub order_id: String,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub actor: Actor,
}

/// `POST /api/coupons` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponCreate {
    pub discount_value: Decimal,
    #[serde(default)]
    pub applicable_products: Vec<String>,
    #[serde(default)]
    pub minimum_order_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_discount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_usage_limit: Option<u32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

/// `PUT /api/coupons/{id}` body (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CouponUpdate {
    pub discount_value: Option<Decimal>,
    pub applicable_products: Option<Vec<String>>,
    pub minimum_order_amount: Option<Decimal>,
    pub maximum_discount: Option<Decimal>,
    pub usage_limit: Option<u32>,
    pub user_usage_limit: Option<u32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

/// `POST /api/staff` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffCreate {
    pub seller_id: String,
    pub name: String,
    pub department: Department,
    pub role: StaffRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Decimal>,
}

/// `PUT /api/staff/{id}` body (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StaffUpdate {
    pub name: Option<String>,
    pub department: Option<Department>,
    pub role: Option<StaffRole>,
    pub status: Option<StaffStatus>,
    pub salary: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
}

/// Hours worked by one hourly staff member in the period
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffHours {
    pub staff_id: String,
    pub hours: Decimal,
}

/// `POST /api/staff/payroll/process` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPayrollRequest {
    pub seller_id: String,
    pub period: PayrollPeriod,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default)]
    pub hours: Vec<StaffHours>,
}

/// `POST /api/drivers` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Paginated list envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}
