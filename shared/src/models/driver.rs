//! Delivery driver model

use serde::{Deserialize, Serialize};

/// Driver availability
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    #[default]
    Available,
    Busy,
    Offline,
}

/// A delivery driver
///
/// Availability is flipped atomically by the dispatch coordinator:
/// AVAILABLE → BUSY on dispatch, BUSY → AVAILABLE on delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub status: DriverStatus,
}
