//! Tenant quota value object.

use serde::{Deserialize, Serialize};

/// Allocation and usage of a tenant at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotaUsage {
    /// Granted capacity in bytes.
    pub allocated_bytes: i64,
    /// Charged bytes.
    pub used_bytes: i64,
    /// Bytes still available (zero when over-allocated).
    pub available_bytes: i64,
    /// Usage percentage (0.0 - 100.0+).
    pub usage_percent: f64,
}

impl QuotaUsage {
    /// Create a quota from allocated and used values.
    pub fn new(allocated_bytes: i64, used_bytes: i64) -> Self {
        let available_bytes = (allocated_bytes - used_bytes).max(0);
        let usage_percent = if allocated_bytes <= 0 {
            0.0
        } else {
            (used_bytes as f64 / allocated_bytes as f64) * 100.0
        };

        Self {
            allocated_bytes,
            used_bytes,
            available_bytes,
            usage_percent,
        }
    }

    /// Check if charging `additional_bytes` would go past the allocation.
    pub fn would_exceed(&self, additional_bytes: i64) -> bool {
        self.used_bytes.saturating_add(additional_bytes) > self.allocated_bytes
    }
}

/// Outcome of applying a signed delta to a tenant's used bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageAdjustment {
    /// Used bytes after the adjustment.
    pub used_bytes: i64,
    /// Whether the result would have gone negative and was clamped to zero.
    pub clamped: bool,
}

impl UsageAdjustment {
    /// Apply `delta` to `used_bytes`, clamping at zero.
    pub fn apply(used_bytes: i64, delta: i64) -> Self {
        let next = used_bytes.saturating_add(delta);
        Self {
            used_bytes: next.max(0),
            clamped: next < 0,
        }
    }
}
