//! Driver registry and dispatch coordination
//!
//! A driver carries at most one shipped order at a time. Assignment is an
//! atomic check-and-set under the registry's write lock: two dispatches
//! racing for the same driver cannot both see AVAILABLE.

use std::collections::HashMap;

use parking_lot::RwLock;
use shared::{Driver, DriverCreate, DriverStatus};
use uuid::Uuid;

use super::error::{OrderError, OrderResult};

#[derive(Default)]
pub struct DriverRegistry {
    drivers: RwLock<HashMap<String, Driver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, req: DriverCreate) -> OrderResult<Driver> {
        if req.name.trim().is_empty() {
            return Err(OrderError::Validation(
                "driver name must not be empty".to_string(),
            ));
        }
        let driver = Driver {
            id: Uuid::new_v4().to_string(),
            name: req.name.trim().to_string(),
            phone: req.phone,
            status: DriverStatus::Available,
        };
        self.drivers
            .write()
            .insert(driver.id.clone(), driver.clone());
        Ok(driver)
    }

    pub fn get(&self, id: &str) -> OrderResult<Driver> {
        self.drivers
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| OrderError::NotFound(format!("driver {}", id)))
    }

    pub fn list(&self) -> Vec<Driver> {
        let mut drivers: Vec<Driver> = self.drivers.read().values().cloned().collect();
        drivers.sort_by(|a, b| a.name.cmp(&b.name));
        drivers
    }

    pub fn set_status(&self, id: &str, status: DriverStatus) -> OrderResult<Driver> {
        let mut drivers = self.drivers.write();
        let driver = drivers
            .get_mut(id)
            .ok_or_else(|| OrderError::NotFound(format!("driver {}", id)))?;
        driver.status = status;
        Ok(driver.clone())
    }

    /// Atomically claim an AVAILABLE driver for a dispatch
    pub fn acquire(&self, id: &str) -> OrderResult<Driver> {
        let mut drivers = self.drivers.write();
        let driver = drivers
            .get_mut(id)
            .ok_or_else(|| OrderError::NotFound(format!("driver {}", id)))?;
        if driver.status != DriverStatus::Available {
            return Err(OrderError::DriverUnavailable(id.to_string()));
        }
        driver.status = DriverStatus::Busy;
        Ok(driver.clone())
    }

    /// Free a driver after delivery (or a failed dispatch commit)
    ///
    /// Drivers who went OFFLINE mid-route stay offline.
    pub fn release(&self, id: &str) {
        let mut drivers = self.drivers.write();
        if let Some(driver) = drivers.get_mut(id)
            && driver.status == DriverStatus::Busy
        {
            driver.status = DriverStatus::Available;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_driver() -> (DriverRegistry, Driver) {
        let registry = DriverRegistry::new();
        let driver = registry
            .create(DriverCreate {
                name: "Sam Porter".to_string(),
                phone: None,
            })
            .unwrap();
        (registry, driver)
    }

    #[test]
    fn acquire_flips_available_to_busy() {
        let (registry, driver) = registry_with_driver();
        let claimed = registry.acquire(&driver.id).unwrap();
        assert_eq!(claimed.status, DriverStatus::Busy);

        let result = registry.acquire(&driver.id);
        assert!(matches!(result, Err(OrderError::DriverUnavailable(_))));
    }

    #[test]
    fn release_restores_availability() {
        let (registry, driver) = registry_with_driver();
        registry.acquire(&driver.id).unwrap();
        registry.release(&driver.id);
        assert_eq!(
            registry.get(&driver.id).unwrap().status,
            DriverStatus::Available
        );
    }

    #[test]
    fn release_does_not_resurrect_offline_driver() {
        let (registry, driver) = registry_with_driver();
        registry.acquire(&driver.id).unwrap();
        registry
            .set_status(&driver.id, DriverStatus::Offline)
            .unwrap();
        registry.release(&driver.id);
        assert_eq!(
            registry.get(&driver.id).unwrap().status,
            DriverStatus::Offline
        );
    }

    #[test]
    fn offline_driver_cannot_be_acquired() {
        let (registry, driver) = registry_with_driver();
        registry
            .set_status(&driver.id, DriverStatus::Offline)
            .unwrap();
        assert!(matches!(
            registry.acquire(&driver.id),
            Err(OrderError::DriverUnavailable(_))
        ));
    }

    #[test]
    fn unknown_driver_is_not_found() {
        let registry = DriverRegistry::new();
        assert!(matches!(
            registry.acquire("nope"),
            Err(OrderError::NotFound(_))
        ));
    }
}
