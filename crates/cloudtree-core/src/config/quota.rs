//! Tenant quota defaults.

use serde::{Deserialize, Serialize};

/// Quota settings applied when provisioning tenants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Allocated bytes for a tenant provisioned without an explicit quota.
    #[serde(default = "default_allocated")]
    pub default_allocated_bytes: i64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            default_allocated_bytes: default_allocated(),
        }
    }
}

fn default_allocated() -> i64 {
    10_737_418_240 // 10 GB
}
