use std::sync::Arc;

use dashmap::DashMap;
use shared::SyncPayload;
use tokio::sync::broadcast;

use crate::core::Config;
use crate::coupons::CouponEngine;
use crate::orders::{DriverRegistry, OrderManager, OrderSettings};
use crate::payroll::PayrollService;
use crate::pricing::CommissionCalculator;

/// Per-resource version counters
///
/// Lock-free via DashMap; each resource type carries an independent,
/// atomically incremented version. Consumers compare versions to decide
/// whether a sync payload is stale.
#[derive(Debug, Default)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment and return the new version (first call returns 1)
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

/// Shared handle to every service; cheap to clone
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub orders: Arc<OrderManager>,
    pub coupons: Arc<CouponEngine>,
    pub drivers: Arc<DriverRegistry>,
    pub payroll: Arc<PayrollService>,
    pub resource_versions: Arc<ResourceVersions>,
    sync_tx: broadcast::Sender<SyncPayload>,
}

impl ServerState {
    pub fn initialize(config: &Config) -> Self {
        let coupons = Arc::new(CouponEngine::new());
        let drivers = Arc::new(DriverRegistry::new());
        let commission = CommissionCalculator::new(config.default_commission_rate);
        let orders = Arc::new(OrderManager::new(
            OrderSettings {
                currency: config.currency.clone(),
                shipping_flat_rate: config.shipping_flat_rate,
                free_shipping_threshold: config.free_shipping_threshold,
                estimated_delivery_days: config.estimated_delivery_days,
            },
            commission,
            coupons.clone(),
            drivers.clone(),
        ));
        let (sync_tx, _) = broadcast::channel(256);

        Self {
            config: config.clone(),
            orders,
            coupons,
            drivers,
            payroll: Arc::new(PayrollService::new()),
            resource_versions: Arc::new(ResourceVersions::new()),
            sync_tx,
        }
    }

    /// Subscribe to resource change notifications
    pub fn subscribe_sync(&self) -> broadcast::Receiver<SyncPayload> {
        self.sync_tx.subscribe()
    }

    /// Broadcast a resource change to all subscribers
    ///
    /// The version is auto-incremented per resource. Send errors (no
    /// subscribers) are ignored.
    pub fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.resource_versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        let _ = self.sync_tx.send(payload);
    }
}
