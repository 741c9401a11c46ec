//! In-memory order store
//!
//! Orders are cloned out on read; the stored copy only changes through
//! [`OrderStore::put`], which enforces version monotonicity. Listing is
//! filtered, sorted newest-first, then paginated.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use shared::{Order, OrderStatus, Paginated};

use super::error::{OrderError, OrderResult};

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// List filters; all optional, combined with AND
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub buyer_id: Option<String>,
    pub seller_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub struct OrderStore {
    orders: RwLock<HashMap<String, Order>>,
    sequence: AtomicU64,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Next human-readable order number, e.g. `MKT20260825-10001`
    pub fn next_order_number(&self, now: DateTime<Utc>) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        format!("MKT{}-{}", now.format("%Y%m%d"), 10_000 + seq)
    }

    pub fn insert(&self, order: Order) -> OrderResult<()> {
        let mut orders = self.orders.write();
        if orders.contains_key(&order.id) {
            return Err(OrderError::ConcurrencyConflict(order.id));
        }
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    pub fn get(&self, id: &str) -> OrderResult<Order> {
        self.orders
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| OrderError::NotFound(format!("order {}", id)))
    }

    /// Write back a mutated order
    ///
    /// The incoming version must not be behind the stored one; a lower
    /// version means the caller mutated a stale snapshot.
    pub fn put(&self, order: Order) -> OrderResult<()> {
        let mut orders = self.orders.write();
        match orders.get(&order.id) {
            None => Err(OrderError::NotFound(format!("order {}", order.id))),
            Some(stored) if stored.version > order.version => {
                Err(OrderError::ConcurrencyConflict(order.id))
            }
            Some(_) => {
                orders.insert(order.id.clone(), order);
                Ok(())
            }
        }
    }

    pub fn list(&self, query: &OrderQuery) -> Paginated<Order> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);

        let orders = self.orders.read();
        let mut matched: Vec<Order> = orders
            .values()
            .filter(|o| query.status.is_none_or(|s| o.status == s))
            .filter(|o| {
                query
                    .buyer_id
                    .as_deref()
                    .is_none_or(|b| o.buyer_id == b)
            })
            .filter(|o| {
                query
                    .seller_id
                    .as_deref()
                    .is_none_or(|s| o.seller_id == s)
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        // usize arithmetic: u32 page * limit can overflow
        let start = (page as usize - 1) * limit as usize;
        let items = matched
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        Paginated {
            items,
            page,
            limit,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::{OrderItem, PaymentStatus, ShippingAddress};

    fn sample_order(id: &str, buyer: &str, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            order_number: format!("MKT20260825-{}", id),
            buyer_id: buyer.to_string(),
            seller_id: "seller-1".to_string(),
            status,
            payment_status: PaymentStatus::Unpaid,
            items: vec![OrderItem {
                product_id: "prod-1".to_string(),
                seller_sku: "SKU-1".to_string(),
                name: "Widget".to_string(),
                category: None,
                unit_price: Decimal::TEN,
                display_price: Decimal::TEN,
                quantity: 1,
                commission: Decimal::ZERO,
            }],
            subtotal: Decimal::TEN,
            shipping_cost: Decimal::ZERO,
            platform_commission: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total_amount: Decimal::TEN,
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

    #[test]
    fn order_numbers_are_sequential_and_dated() {
        let store = OrderStore::new();
        let now = Utc::now();
        let first = store.next_order_number(now);
        let second = store.next_order_number(now);
        assert_eq!(first, format!("MKT{}-10001", now.format("%Y%m%d")));
        assert_eq!(second, format!("MKT{}-10002", now.format("%Y%m%d")));
    }

    #[test]
    fn put_rejects_stale_version() {
        let store = OrderStore::new();
        let order = sample_order("o1", "buyer-1", OrderStatus::Processing);
        store.insert(order.clone()).unwrap();

        let mut advanced = order.clone();
        advanced.version = 2;
        store.put(advanced).unwrap();

        let stale = order; // still version 0
        assert!(matches!(
            store.put(stale),
            Err(OrderError::ConcurrencyConflict(_))
        ));
    }

    #[test]
    fn list_filters_and_paginates() {
        let store = OrderStore::new();
        for i in 0..5 {
            store
                .insert(sample_order(
                    &format!("o{}", i),
                    "buyer-1",
                    OrderStatus::Processing,
                ))
                .unwrap();
        }
        store
            .insert(sample_order("o5", "buyer-2", OrderStatus::Shipped))
            .unwrap();

        let page = store.list(&OrderQuery {
            buyer_id: Some("buyer-1".to_string()),
            limit: Some(2),
            ..Default::default()
        });
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page, 1);

        let page = store.list(&OrderQuery {
            status: Some(OrderStatus::Shipped),
            ..Default::default()
        });
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].buyer_id, "buyer-2");
    }

    #[test]
    fn page_far_past_the_end_is_empty() {
        let store = OrderStore::new();
        store
            .insert(sample_order("o1", "buyer-1", OrderStatus::Processing))
            .unwrap();

        let page = store.list(&OrderQuery {
            page: Some(u32::MAX),
            limit: Some(MAX_PAGE_LIMIT),
            ..Default::default()
        });
        assert_eq!(page.total, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.page, u32::MAX);
    }

    #[test]
    fn duplicate_insert_rejected() {
        let store = OrderStore::new();
        let order = sample_order("o1", "buyer-1", OrderStatus::Processing);
        store.insert(order.clone()).unwrap();
        assert!(store.insert(order).is_err());
    }
}
