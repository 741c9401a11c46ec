//! Mutation delta payload
//!
//! Every applied mutation broadcasts one of these so connected clients can
//! patch their local view instead of refetching whole lists.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    /// Resource type ("order", "coupon", "staff", ...)
    pub resource: String,
    /// Per-resource monotonic version, lets clients drop stale deltas
    pub version: u64,
    /// "created" | "updated" | "deleted"
    pub action: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
