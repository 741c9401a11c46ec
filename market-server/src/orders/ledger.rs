//! Payment ledger
//!
//! Append-only record of payments against orders. Entries are never mutated
//! or deleted; the reconciliation summary is always recomputed from the log.
//! Comparisons against the order total are exact `Decimal` equality.
//!
//! The ledger itself only guards its map; callers serialize writes per order
//! so the remaining-balance check and the append are one atomic step.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::{Order, PaymentRecord, PaymentStatus, PaymentSummary, RecordedBy};
use uuid::Uuid;

use super::error::{OrderError, OrderResult};
use crate::money::validate_payment_amount;

#[derive(Default)]
pub struct PaymentLedger {
    entries: RwLock<HashMap<String, Vec<PaymentRecord>>>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total paid against one order
    pub fn paid(&self, order_id: &str) -> Decimal {
        self.entries
            .read()
            .get(order_id)
            .map(|records| records.iter().map(|r| r.amount).sum())
            .unwrap_or(Decimal::ZERO)
    }

    /// All ledger entries for one order, in recording order
    pub fn records(&self, order_id: &str) -> Vec<PaymentRecord> {
        self.entries
            .read()
            .get(order_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Validate against the remaining balance and append
    ///
    /// Rejects overpayment of any amount; the ledger is unchanged on
    /// rejection. Caller must hold the order's write lock.
    pub fn record(
        &self,
        order: &Order,
        amount: Decimal,
        method: &str,
        recorded_by: RecordedBy,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> OrderResult<PaymentRecord> {
        validate_payment_amount(amount)?;

        let mut entries = self.entries.write();
        let records = entries.entry(order.id.clone()).or_default();
        let paid: Decimal = records.iter().map(|r| r.amount).sum();
        let remaining = order.total_amount - paid;
        if amount > remaining {
            return Err(OrderError::Overpayment {
                attempted: amount,
                remaining,
            });
        }

        let record = PaymentRecord {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            amount,
            method: method.to_string(),
            recorded_by,
            notes,
            created_at: now,
        };
        records.push(record.clone());
        Ok(record)
    }

    /// Reconciliation projection for one order
    ///
    /// Exactly one of the three flags is true.
    pub fn summary(&self, order: &Order) -> PaymentSummary {
        let paid = self.paid(&order.id);
        summarize(order.total_amount, paid)
    }

    /// Projected payment status for the order header
    pub fn payment_status(&self, order: &Order) -> PaymentStatus {
        let summary = self.summary(order);
        if summary.is_fully_paid {
            PaymentStatus::Paid
        } else if summary.is_partially_paid {
            PaymentStatus::PartiallyPaid
        } else {
            PaymentStatus::Unpaid
        }
    }
}

fn summarize(total: Decimal, paid: Decimal) -> PaymentSummary {
    let remaining = total - paid;
    let is_fully_paid = paid == total;
    PaymentSummary {
        total_to_be_paid: total,
        paid,
        remaining,
        is_fully_paid,
        is_partially_paid: !is_fully_paid && paid > Decimal::ZERO,
        has_no_payment: !is_fully_paid && paid == Decimal::ZERO,
    }
}
