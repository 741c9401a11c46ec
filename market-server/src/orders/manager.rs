//! Order manager
//!
//! Facade over the store, ledger, state machine, driver registry, coupon
//! engine and commission calculator. Every mutation of a single order runs
//! under that order's lock, so transition checks, ledger math and the
//! write-back are one serialized step. Two concurrent requests against the
//! same order always observe each other's committed effects.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    Actor, CreateOrderRequest, DispatchRequest, FulfillmentRequest, Order, OrderAction, OrderItem,
    OrderStatus, Paginated, PaymentRecord, PaymentStatus, PaymentSummary, PaymentTiming,
    RecordCashRequest, RecordedBy, StatusChangeRequest,
};
use tracing::info;
use uuid::Uuid;

use super::dispatch::DriverRegistry;
use super::error::{OrderError, OrderResult};
use super::ledger::PaymentLedger;
use super::state_machine::{self, Applied, Trigger};
use super::storage::{OrderQuery, OrderStore};
use crate::coupons::CouponEngine;
use crate::money::{round_money, validate_price, validate_quantity};
use crate::pricing::{CommissionCalculator, shipping_cost};

/// Engine knobs, resolved from configuration at startup
#[derive(Debug, Clone)]
pub struct OrderSettings {
    pub currency: String,
    pub shipping_flat_rate: Decimal,
    pub free_shipping_threshold: Decimal,
    pub estimated_delivery_days: i64,
}

/// Full read projection of one order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub payment_summary: PaymentSummary,
    pub allowed_actions: Vec<OrderAction>,
}

pub struct OrderManager {
    settings: OrderSettings,
    store: OrderStore,
    ledger: PaymentLedger,
    commission: CommissionCalculator,
    coupons: Arc<CouponEngine>,
    drivers: Arc<DriverRegistry>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl OrderManager {
    pub fn new(
        settings: OrderSettings,
        commission: CommissionCalculator,
        coupons: Arc<CouponEngine>,
        drivers: Arc<DriverRegistry>,
    ) -> Self {
        Self {
            settings,
            store: OrderStore::new(),
            ledger: PaymentLedger::new(),
            commission,
            coupons,
            drivers,
            locks: DashMap::new(),
        }
    }

    fn order_lock(&self, id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // ========== Checkout ==========

    /// Validate, price and commit a new order
    ///
    /// Coupon redemption is the last fallible step: a coupon failure never
    /// leaves a half-created order, and a validation failure never burns a
    /// redemption.
    pub fn create_order(&self, req: CreateOrderRequest, now: DateTime<Utc>) -> OrderResult<Order> {
        if req.buyer_id.trim().is_empty() || req.seller_id.trim().is_empty() {
            return Err(OrderError::Validation(
                "buyerId and sellerId are required".to_string(),
            ));
        }
        if req.items.is_empty() {
            return Err(OrderError::Validation(
                "order must contain at least one item".to_string(),
            ));
        }
        if req.shipping_address.recipient.trim().is_empty()
            || req.shipping_address.line1.trim().is_empty()
        {
            return Err(OrderError::Validation(
                "shipping address requires recipient and line1".to_string(),
            ));
        }

        let mut subtotal = Decimal::ZERO;
        let mut platform_commission = Decimal::ZERO;
        let mut items: Vec<OrderItem> = Vec::with_capacity(req.items.len());
        for input in &req.items {
            validate_price("unitPrice", input.unit_price)?;
            validate_quantity(input.quantity)?;
            let display_price = input.display_price.unwrap_or(input.unit_price);
            validate_price("displayPrice", display_price)?;

            let line_commission = self.commission.line_commission(
                &req.seller_id,
                input.category.as_deref(),
                input.unit_price,
                input.quantity,
            );
            subtotal += input.unit_price * Decimal::from(input.quantity);
            platform_commission += line_commission;

            items.push(OrderItem {
                product_id: input.product_id.clone(),
                seller_sku: input.seller_sku.clone(),
                name: input.name.clone(),
                category: input.category.clone(),
                unit_price: input.unit_price,
                display_price,
                quantity: input.quantity,
                commission: line_commission,
            });
        }
        let subtotal = round_money(subtotal);
        let shipping = shipping_cost(
            subtotal,
            self.settings.shipping_flat_rate,
            self.settings.free_shipping_threshold,
        );

        let order_id = Uuid::new_v4().to_string();

        // Last fallible step before the insert
        let discount = match &req.coupon_code {
            Some(code) => {
                let product_ids: Vec<String> =
                    items.iter().map(|i| i.product_id.clone()).collect();
                self.coupons
                    .redeem(code, &req.buyer_id, &order_id, subtotal, &product_ids, now)?
            }
            None => Decimal::ZERO,
        };

        let total_amount = round_money(subtotal + shipping + platform_commission - discount);
        let status = match req.payment_timing {
            PaymentTiming::PayNow => OrderStatus::AwaitingSellerAcceptance,
            PaymentTiming::PayOnDelivery => OrderStatus::PendingPayment,
        };

        let order = Order {
            id: order_id,
            order_number: self.store.next_order_number(now),
            buyer_id: req.buyer_id,
            seller_id: req.seller_id,
            status,
            payment_status: PaymentStatus::Unpaid,
            items,
            subtotal,
            shipping_cost: shipping,
            platform_commission,
            discount_amount: discount,
            total_amount,
            currency: req
                .currency
                .unwrap_or_else(|| self.settings.currency.clone()),
            shipping_address: req.shipping_address,
            driver_id: None,
            coupon_code: req.coupon_code,
            po_number: req.po_number,
            cost_center: req.cost_center,
            notes: req.notes,
            rejection_reason: None,
            created_at: now,
            seller_accepted_at: None,
            dispatched_at: None,
            estimated_delivery_date: None,
            actual_delivery_date: None,
            version: 0,
        };
        self.store.insert(order.clone())?;
        info!(
            order = %order.order_number,
            total = %order.total_amount,
            status = ?order.status,
            "order created"
        );
        Ok(order)
    }

    // ========== Reads ==========

    pub fn get_order(&self, id: &str) -> OrderResult<Order> {
        self.store.get(id)
    }

    pub fn order_detail(&self, id: &str) -> OrderResult<OrderDetail> {
        let order = self.store.get(id)?;
        let summary = self.ledger.summary(&order);
        let actions = state_machine::allowed_actions(order.status, summary.is_fully_paid);
        Ok(OrderDetail {
            order,
            payment_summary: summary,
            allowed_actions: actions,
        })
    }

    pub fn list_orders(&self, query: &OrderQuery) -> Paginated<Order> {
        self.store.list(query)
    }

    pub fn payment_summary(&self, order_id: &str) -> OrderResult<PaymentSummary> {
        let order = self.store.get(order_id)?;
        Ok(self.ledger.summary(&order))
    }

    pub fn payment_records(&self, order_id: &str) -> OrderResult<Vec<PaymentRecord>> {
        self.store.get(order_id)?;
        Ok(self.ledger.records(order_id))
    }

    // ========== Transitions ==========

    /// `PATCH /api/orders/{id}/status` — requested target mapped to a trigger
    pub fn change_status(
        &self,
        id: &str,
        req: StatusChangeRequest,
        now: DateTime<Utc>,
    ) -> OrderResult<Order> {
        let trigger = match req.status {
            OrderStatus::Processing => Trigger::Accept,
            OrderStatus::SellerRejected => Trigger::Reject {
                reason: req.rejection_reason.unwrap_or_default(),
            },
            OrderStatus::Cancelled => Trigger::Cancel,
            OrderStatus::Returned => Trigger::MarkReturned,
            OrderStatus::Disputed => Trigger::OpenDispute,
            OrderStatus::Refunded => Trigger::Refund,
            OrderStatus::PaymentFailed => Trigger::MarkPaymentFailed,
            other => {
                return Err(OrderError::Validation(format!(
                    "status {:?} cannot be requested directly",
                    other
                )));
            }
        };
        self.apply_trigger(id, &trigger, &req.actor, now)
    }

    /// `PATCH /api/orders/{id}/fulfillment` — delivery-side milestones
    pub fn fulfillment(
        &self,
        id: &str,
        req: FulfillmentRequest,
        now: DateTime<Utc>,
    ) -> OrderResult<Order> {
        match req.status {
            OrderStatus::Delivered => self.apply_trigger(id, &Trigger::MarkDelivered, &req.actor, now),
            OrderStatus::Shipped => {
                // Shipped is reached through dispatch; accept a retry of an
                // already-shipped order as a no-op
                let order = self.store.get(id)?;
                if order.status == OrderStatus::Shipped {
                    Ok(order)
                } else {
                    Err(OrderError::Validation(
                        "orders are shipped via the dispatch operation".to_string(),
                    ))
                }
            }
            other => Err(OrderError::Validation(format!(
                "fulfillment cannot set status {:?}",
                other
            ))),
        }
    }

    /// `POST /api/orders/{id}/dispatch` — claim the driver, then ship
    ///
    /// The driver is released again if the transition fails after the claim.
    pub fn dispatch(
        &self,
        id: &str,
        req: DispatchRequest,
        now: DateTime<Utc>,
    ) -> OrderResult<Order> {
        let lock = self.order_lock(id);
        let _guard = lock.lock();

        let mut order = self.store.get(id)?;
        let driver = self.drivers.acquire(&req.driver_id)?;
        let estimated = req
            .estimated_delivery_date
            .unwrap_or_else(|| now + Duration::days(self.settings.estimated_delivery_days));
        let trigger = Trigger::Dispatch {
            driver_id: driver.id.clone(),
            estimated_delivery_date: estimated,
        };

        match state_machine::apply(&mut order, &trigger, &req.actor, now) {
            Ok(Applied::Changed) => {
                if let Some(notes) = req.dispatch_notes {
                    order.notes = Some(match order.notes.take() {
                        Some(existing) => format!("{}\n{}", existing, notes),
                        None => notes,
                    });
                }
                self.store.put(order.clone())?;
                info!(order = %order.order_number, driver = %driver.id, "order dispatched");
                Ok(order)
            }
            Ok(Applied::Noop) => {
                // Already shipped; the fresh claim must not stick
                self.drivers.release(&driver.id);
                Ok(order)
            }
            Err(e) => {
                self.drivers.release(&driver.id);
                Err(e)
            }
        }
    }

    /// `POST /api/payments/record-cash`
    ///
    /// Accepted only while the order is awaiting payment or delivered.
    /// Reaching fully paid on a PENDING_PAYMENT order advances it to
    /// AWAITING_SELLER_ACCEPTANCE in the same serialized step.
    pub fn record_cash_payment(
        &self,
        req: RecordCashRequest,
        now: DateTime<Utc>,
    ) -> OrderResult<(PaymentRecord, PaymentSummary, Order)> {
        let lock = self.order_lock(&req.order_id);
        let _guard = lock.lock();

        let mut order = self.store.get(&req.order_id)?;
        if !matches!(
            order.status,
            OrderStatus::PendingPayment | OrderStatus::Delivered
        ) {
            return Err(OrderError::Validation(format!(
                "payments cannot be recorded while the order is {:?}",
                order.status
            )));
        }

        let recorded_by = match req.actor {
            Actor::System => RecordedBy::System,
            _ => RecordedBy::Staff,
        };
        let record = self
            .ledger
            .record(&order, req.amount, "CASH", recorded_by, req.notes, now)?;
        let summary = self.ledger.summary(&order);

        order.payment_status = self.ledger.payment_status(&order);
        if summary.is_fully_paid && order.status == OrderStatus::PendingPayment {
            state_machine::apply(&mut order, &Trigger::PaymentCompleted, &Actor::System, now)?;
        } else {
            order.version += 1;
        }
        self.store.put(order.clone())?;
        info!(
            order = %order.order_number,
            amount = %record.amount,
            remaining = %summary.remaining,
            "payment recorded"
        );
        Ok((record, summary, order))
    }

    /// Shared transition path: lock, load, apply, persist
    fn apply_trigger(
        &self,
        id: &str,
        trigger: &Trigger,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> OrderResult<Order> {
        let lock = self.order_lock(id);
        let _guard = lock.lock();

        let mut order = self.store.get(id)?;
        let previous_driver = order.driver_id.clone();
        match state_machine::apply(&mut order, trigger, actor, now)? {
            Applied::Noop => Ok(order),
            Applied::Changed => {
                // Delivery or cancellation of a shipped order frees the driver
                if let Some(driver_id) = &previous_driver
                    && matches!(
                        order.status,
                        OrderStatus::Delivered | OrderStatus::Cancelled
                    )
                {
                    self.drivers.release(driver_id);
                }
                self.store.put(order.clone())?;
                info!(order = %order.order_number, status = ?order.status, "order transitioned");
                Ok(order)
            }
        }
    }
}
