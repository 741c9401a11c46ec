//! Order lifecycle state machine
//!
//! Single owner of the legal transition table. Handlers map requested target
//! statuses onto [`Trigger`]s; the UI renders `{state, allowedActions}` from
//! [`allowed_actions`] instead of comparing status strings.
//!
//! Transition processing order:
//! 1. idempotency — re-requesting an already-applied transition is a
//!    success with no side effects (the at-most-once contract retrying
//!    clients rely on)
//! 2. legality — the (state, trigger) pair must be in the table
//! 3. authorization — actor identity/role check
//! 4. payload validation — e.g. non-empty rejection reason
//! 5. mutation — status, milestone timestamps, version bump

use chrono::{DateTime, Utc};
use shared::{Actor, Order, OrderAction, OrderStatus};

use super::error::{OrderError, OrderResult};

/// A transition request against one order
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Seller accepts the order
    Accept,
    /// Seller rejects with a reason
    Reject { reason: String },
    /// Driver assigned, order leaves the warehouse
    Dispatch {
        driver_id: String,
        estimated_delivery_date: DateTime<Utc>,
    },
    MarkDelivered,
    Cancel,
    /// Post-delivery return accepted (admin)
    MarkReturned,
    /// Post-delivery dispute opened (admin)
    OpenDispute,
    /// Settlement of a return/dispute (admin)
    Refund,
    /// Gateway reported a failed payment
    MarkPaymentFailed,
    /// Ledger reached fully paid on a PENDING_PAYMENT order (internal)
    PaymentCompleted,
}

impl Trigger {
    /// The state this trigger lands in on success
    pub fn target(&self) -> OrderStatus {
        match self {
            Trigger::Accept => OrderStatus::Processing,
            Trigger::Reject { .. } => OrderStatus::SellerRejected,
            Trigger::Dispatch { .. } => OrderStatus::Shipped,
            Trigger::MarkDelivered => OrderStatus::Delivered,
            Trigger::Cancel => OrderStatus::Cancelled,
            Trigger::MarkReturned => OrderStatus::Returned,
            Trigger::OpenDispute => OrderStatus::Disputed,
            Trigger::Refund => OrderStatus::Refunded,
            Trigger::MarkPaymentFailed => OrderStatus::PaymentFailed,
            Trigger::PaymentCompleted => OrderStatus::AwaitingSellerAcceptance,
        }
    }
}

/// Outcome of a transition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The order was mutated
    Changed,
    /// Transition had already been applied; nothing written
    Noop,
}

/// Is (state, trigger) in the legal transition table?
fn is_legal(from: OrderStatus, trigger: &Trigger) -> bool {
    use OrderStatus::*;
    match trigger {
        Trigger::Accept | Trigger::Reject { .. } => from == AwaitingSellerAcceptance,
        Trigger::Dispatch { .. } => from == Processing,
        Trigger::MarkDelivered => from == Shipped,
        Trigger::Cancel => matches!(
            from,
            PendingPayment | AwaitingSellerAcceptance | Processing | Shipped
        ),
        Trigger::MarkReturned | Trigger::OpenDispute => from == Delivered,
        Trigger::Refund => matches!(from, Returned | Disputed),
        Trigger::MarkPaymentFailed | Trigger::PaymentCompleted => from == PendingPayment,
    }
}

/// Actor authorization per trigger
fn authorize(order: &Order, trigger: &Trigger, actor: &Actor) -> OrderResult<()> {
    match trigger {
        Trigger::Accept | Trigger::Reject { .. } => match actor {
            Actor::Seller { id } if *id == order.seller_id => Ok(()),
            _ => Err(OrderError::Forbidden(
                "only the order's seller may accept or reject".to_string(),
            )),
        },
        Trigger::Cancel => match actor {
            Actor::Admin | Actor::System => Ok(()),
            // Buyers may cancel only before seller acceptance
            Actor::Buyer { id } if *id == order.buyer_id => {
                if matches!(
                    order.status,
                    OrderStatus::PendingPayment | OrderStatus::AwaitingSellerAcceptance
                ) {
                    Ok(())
                } else {
                    Err(OrderError::Forbidden(
                        "buyers may cancel only before seller acceptance".to_string(),
                    ))
                }
            }
            _ => Err(OrderError::Forbidden(
                "not authorized to cancel this order".to_string(),
            )),
        },
        Trigger::Dispatch { .. } | Trigger::MarkDelivered => match actor {
            Actor::Admin | Actor::System => Ok(()),
            Actor::Seller { id } if *id == order.seller_id => Ok(()),
            _ => Err(OrderError::Forbidden(
                "only the seller or an admin may fulfil this order".to_string(),
            )),
        },
        Trigger::MarkReturned | Trigger::OpenDispute | Trigger::Refund => {
            if actor.is_admin() {
                Ok(())
            } else {
                Err(OrderError::Forbidden(
                    "post-delivery exception paths are admin-only".to_string(),
                ))
            }
        }
        Trigger::MarkPaymentFailed => match actor {
            Actor::Admin | Actor::System => Ok(()),
            _ => Err(OrderError::Forbidden(
                "payment failure is reported by the gateway or an admin".to_string(),
            )),
        },
        Trigger::PaymentCompleted => match actor {
            Actor::System => Ok(()),
            _ => Err(OrderError::Forbidden(
                "payment completion is an internal transition".to_string(),
            )),
        },
    }
}

/// Attempt a transition, mutating the order on success
pub fn apply(
    order: &mut Order,
    trigger: &Trigger,
    actor: &Actor,
    now: DateTime<Utc>,
) -> OrderResult<Applied> {
    let target = trigger.target();

    // 1. Idempotency: already there, nothing to do
    if order.status == target {
        return Ok(Applied::Noop);
    }

    // 2. Legality
    if !is_legal(order.status, trigger) {
        return Err(OrderError::InvalidTransition {
            from: order.status,
            to: target,
        });
    }

    // 3. Authorization
    authorize(order, trigger, actor)?;

    // 4. Payload validation + 5. mutation
    match trigger {
        Trigger::Accept => {
            order.status = OrderStatus::Processing;
            order.seller_accepted_at = Some(now);
        }
        Trigger::Reject { reason } => {
            if reason.trim().is_empty() {
                return Err(OrderError::Validation(
                    "rejection reason must not be empty".to_string(),
                ));
            }
            order.status = OrderStatus::SellerRejected;
            order.rejection_reason = Some(reason.trim().to_string());
        }
        Trigger::Dispatch {
            driver_id,
            estimated_delivery_date,
        } => {
            order.status = OrderStatus::Shipped;
            order.driver_id = Some(driver_id.clone());
            order.dispatched_at = Some(now);
            order.estimated_delivery_date = Some(*estimated_delivery_date);
        }
        Trigger::MarkDelivered => {
            order.status = OrderStatus::Delivered;
            order.actual_delivery_date = Some(now);
        }
        Trigger::Cancel => {
            order.status = OrderStatus::Cancelled;
        }
        Trigger::MarkReturned => {
            order.status = OrderStatus::Returned;
        }
        Trigger::OpenDispute => {
            order.status = OrderStatus::Disputed;
        }
        Trigger::Refund => {
            order.status = OrderStatus::Refunded;
        }
        Trigger::MarkPaymentFailed => {
            order.status = OrderStatus::PaymentFailed;
        }
        Trigger::PaymentCompleted => {
            order.status = OrderStatus::AwaitingSellerAcceptance;
        }
    }

    order.version += 1;
    Ok(Applied::Changed)
}

/// Actions available in the given state
///
/// `fully_paid` suppresses RecordPayment once the ledger is settled.
pub fn allowed_actions(status: OrderStatus, fully_paid: bool) -> Vec<OrderAction> {
    use OrderStatus::*;
    let mut actions = match status {
        PendingPayment => vec![
            OrderAction::Cancel,
            OrderAction::MarkPaymentFailed,
            OrderAction::RecordPayment,
        ],
        AwaitingSellerAcceptance => vec![
            OrderAction::Accept,
            OrderAction::Reject,
            OrderAction::Cancel,
        ],
        Processing => vec![OrderAction::Dispatch, OrderAction::Cancel],
        Shipped => vec![OrderAction::MarkDelivered, OrderAction::Cancel],
        Delivered => vec![
            OrderAction::MarkReturned,
            OrderAction::OpenDispute,
            OrderAction::RecordPayment,
        ],
        Returned | Disputed => vec![OrderAction::Refund],
        SellerRejected | Cancelled | Refunded | PaymentFailed => vec![],
    };
    if fully_paid {
        actions.retain(|a| *a != OrderAction::RecordPayment);
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use shared::{OrderItem, PaymentStatus, ShippingAddress};

    fn test_order(status: OrderStatus) -> Order {
        Order {
            id: "order-1".to_string(),
            order_number: "MKT20260825-10001".to_string(),
            buyer_id: "buyer-1".to_string(),
            seller_id: "seller-1".to_string(),
            status,
            payment_status: PaymentStatus::Unpaid,
            items: vec![OrderItem {
                product_id: "prod-1".to_string(),
                seller_sku: "SKU-1".to_string(),
                name: "Widget".to_string(),
                category: None,
                unit_price: Decimal::new(1000, 2),
                display_price: Decimal::new(1000, 2),
                quantity: 1,
                commission: Decimal::ZERO,
            }],
            subtotal: Decimal::new(1000, 2),
            shipping_cost: Decimal::ZERO,
            platform_commission: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total_amount: Decimal::new(1000, 2),
            currency: "USD".to_string(),
            shipping_address: ShippingAddress {
                recipient: "Jane Doe".to_string(),
                line1: "1 Main St".to_string(),
                line2: None,
                city: "Springfield".to_string(),
                postal_code: None,
                country: "US".to_string(),
                phone: None,
            },
            driver_id: None,
            coupon_code: None,
            po_number: None,
            cost_center: None,
            notes: None,
            rejection_reason: None,
            created_at: Utc::now(),
            seller_accepted_at: None,
            dispatched_at: None,
            estimated_delivery_date: None,
            actual_delivery_date: None,
            version: 0,
        }
    }

    fn seller() -> Actor {
        Actor::Seller {
            id: "seller-1".to_string(),
        }
    }

    #[test]
    fn accept_sets_milestone() {
        let mut order = test_order(OrderStatus::AwaitingSellerAcceptance);
        let applied = apply(&mut order, &Trigger::Accept, &seller(), Utc::now()).unwrap();
        assert_eq!(applied, Applied::Changed);
        assert_eq!(order.status, OrderStatus::Processing);
        assert!(order.seller_accepted_at.is_some());
        assert_eq!(order.version, 1);
    }

    #[test]
    fn accept_requires_matching_seller() {
        let mut order = test_order(OrderStatus::AwaitingSellerAcceptance);
        let other = Actor::Seller {
            id: "seller-2".to_string(),
        };
        let result = apply(&mut order, &Trigger::Accept, &other, Utc::now());
        assert!(matches!(result, Err(OrderError::Forbidden(_))));
        assert_eq!(order.status, OrderStatus::AwaitingSellerAcceptance);
    }

    #[test]
    fn reject_requires_reason() {
        let mut order = test_order(OrderStatus::AwaitingSellerAcceptance);
        let result = apply(
            &mut order,
            &Trigger::Reject {
                reason: "   ".to_string(),
            },
            &seller(),
            Utc::now(),
        );
        assert!(matches!(result, Err(OrderError::Validation(_))));

        let applied = apply(
            &mut order,
            &Trigger::Reject {
                reason: "out of stock".to_string(),
            },
            &seller(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(applied, Applied::Changed);
        assert_eq!(order.rejection_reason.as_deref(), Some("out of stock"));
    }

    #[test]
    fn no_shipped_without_processing() {
        let mut order = test_order(OrderStatus::AwaitingSellerAcceptance);
        let trigger = Trigger::Dispatch {
            driver_id: "driver-1".to_string(),
            estimated_delivery_date: Utc::now(),
        };
        let result = apply(&mut order, &trigger, &Actor::Admin, Utc::now());
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::AwaitingSellerAcceptance,
                to: OrderStatus::Shipped,
            })
        ));
    }

    #[test]
    fn no_delivered_without_shipped() {
        for from in [
            OrderStatus::PendingPayment,
            OrderStatus::AwaitingSellerAcceptance,
            OrderStatus::Processing,
        ] {
            let mut order = test_order(from);
            let result = apply(&mut order, &Trigger::MarkDelivered, &Actor::Admin, Utc::now());
            assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        }
    }

    #[test]
    fn mark_delivered_is_idempotent() {
        let mut order = test_order(OrderStatus::Shipped);
        apply(&mut order, &Trigger::MarkDelivered, &Actor::Admin, Utc::now()).unwrap();
        let first_date = order.actual_delivery_date;
        let version = order.version;

        let applied =
            apply(&mut order, &Trigger::MarkDelivered, &Actor::Admin, Utc::now()).unwrap();
        assert_eq!(applied, Applied::Noop);
        assert_eq!(order.actual_delivery_date, first_date);
        assert_eq!(order.version, version);
    }

    #[test]
    fn buyer_cancel_only_before_acceptance() {
        let buyer = Actor::Buyer {
            id: "buyer-1".to_string(),
        };
        let mut order = test_order(OrderStatus::AwaitingSellerAcceptance);
        assert!(apply(&mut order, &Trigger::Cancel, &buyer, Utc::now()).is_ok());

        let mut order = test_order(OrderStatus::Processing);
        let result = apply(&mut order, &Trigger::Cancel, &buyer, Utc::now());
        assert!(matches!(result, Err(OrderError::Forbidden(_))));

        // Admin may still cancel after acceptance
        let mut order = test_order(OrderStatus::Processing);
        assert!(apply(&mut order, &Trigger::Cancel, &Actor::Admin, Utc::now()).is_ok());
    }

    #[test]
    fn cancel_from_terminal_state_fails() {
        let mut order = test_order(OrderStatus::Delivered);
        let result = apply(&mut order, &Trigger::Cancel, &Actor::Admin, Utc::now());
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
    }

    #[test]
    fn post_delivery_paths_are_admin_only() {
        let mut order = test_order(OrderStatus::Delivered);
        let result = apply(&mut order, &Trigger::MarkReturned, &seller(), Utc::now());
        assert!(matches!(result, Err(OrderError::Forbidden(_))));

        apply(&mut order, &Trigger::MarkReturned, &Actor::Admin, Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Returned);

        apply(&mut order, &Trigger::Refund, &Actor::Admin, Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Refunded);
    }

    #[test]
    fn payment_completed_advances_pending_order() {
        let mut order = test_order(OrderStatus::PendingPayment);
        apply(
            &mut order,
            &Trigger::PaymentCompleted,
            &Actor::System,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(order.status, OrderStatus::AwaitingSellerAcceptance);
    }

    #[test]
    fn allowed_actions_projection() {
        let actions = allowed_actions(OrderStatus::AwaitingSellerAcceptance, false);
        assert!(actions.contains(&OrderAction::Accept));
        assert!(actions.contains(&OrderAction::Reject));
        assert!(actions.contains(&OrderAction::Cancel));

        let actions = allowed_actions(OrderStatus::Delivered, true);
        assert!(!actions.contains(&OrderAction::RecordPayment));
        assert!(actions.contains(&OrderAction::MarkReturned));

        assert!(allowed_actions(OrderStatus::Cancelled, false).is_empty());
    }
}
