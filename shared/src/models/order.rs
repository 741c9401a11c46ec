//! Order model and lifecycle types
//!
//! The order is the aggregate root of the engine. All monetary fields are
//! `Decimal` — binary floating point never touches a money value. Timestamps
//! are recorded per lifecycle milestone and serialized as ISO-8601.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// Terminal states: `Delivered` (subject to post-delivery exception paths),
/// `SellerRejected`, `Cancelled`, `Refunded`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Cash / delayed-payment orders start here
    PendingPayment,
    /// Paid orders wait for the seller to accept
    AwaitingSellerAcceptance,
    /// Seller declined; terminal but visible to the buyer
    SellerRejected,
    /// Seller accepted, preparing shipment
    Processing,
    /// Driver assigned, en route
    Shipped,
    /// Delivery confirmed
    Delivered,
    Cancelled,
    /// Post-delivery return accepted (admin)
    Returned,
    /// Post-delivery dispute opened (admin)
    Disputed,
    Refunded,
    /// Payment gateway reported failure
    PaymentFailed,
}

impl OrderStatus {
    /// Terminal states admit no further transitions except the
    /// post-delivery exception paths out of `Delivered`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::SellerRejected
                | OrderStatus::Cancelled
                | OrderStatus::Refunded
                | OrderStatus::PaymentFailed
        )
    }
}

/// Payment reconciliation status, projected from the ledger
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    PartiallyPaid,
    Paid,
}

/// Who recorded a payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordedBy {
    Staff,
    Driver,
    System,
}

/// Immutable snapshot of the delivery address, taken at checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub recipient: String,
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A line item, snapshotted from the seller's listing at checkout
///
/// `commission` is computed once at order creation and frozen — historical
/// orders reflect the rate at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub seller_sku: String,
    pub name: String,
    /// Product category, used for the commission rate lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Price the buyer pays per unit
    pub unit_price: Decimal,
    /// Listed price before any listing-level markdown
    pub display_price: Decimal,
    pub quantity: u32,
    /// Platform commission for this line, frozen at creation
    pub commission: Decimal,
}

/// An append-only payment ledger entry
///
/// Never mutated or deleted after creation (audit requirement).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: String,
    pub order_id: String,
    pub amount: Decimal,
    pub method: String,
    pub recorded_by: RecordedBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Projection over the payment ledger for one order
///
/// Exactly one of the three booleans is true at any time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub total_to_be_paid: Decimal,
    pub paid: Decimal,
    pub remaining: Decimal,
    pub is_fully_paid: bool,
    pub is_partially_paid: bool,
    pub has_no_payment: bool,
}

/// Actions the current actor may take on an order in its current state
///
/// The UI renders `{state, allowedActions}` instead of re-deriving
/// transitions from status strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderAction {
    Accept,
    Reject,
    Cancel,
    Dispatch,
    MarkDelivered,
    RecordPayment,
    MarkReturned,
    OpenDispute,
    Refund,
    MarkPaymentFailed,
}

/// A buyer's purchase request spanning one or more seller-fulfilled items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Unique, human-readable (e.g. `MKT20260825-10042`)
    pub order_number: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Non-empty by construction
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    /// Sum of frozen per-item commissions
    pub platform_commission: Decimal,
    pub discount_amount: Decimal,
    /// subtotal + shipping_cost + platform_commission - discount_amount
    pub total_amount: Decimal,
    /// ISO 4217 code
    pub currency: String,
    pub shipping_address: ShippingAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    // === Lifecycle milestones ===
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_accepted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatched_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_delivery_date: Option<DateTime<Utc>>,

    /// Monotonic mutation counter; bumped on every applied change
    #[serde(default)]
    pub version: u64,
}

impl Order {
    /// Sum of paid ledger amounts is tracked on the order for cheap reads;
    /// the ledger remains the source of truth.
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal() && self.status != OrderStatus::Delivered
    }
}
