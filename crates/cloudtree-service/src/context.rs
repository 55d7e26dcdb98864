//! Request context carrying the tenant an operation runs on behalf of.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudtree_core::types::TenantId;

/// Context for the current request.
///
/// Built by the boundary layer once tenant resolution has happened and
/// passed into every engine operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The tenant the requester belongs to.
    pub tenant_id: TenantId,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the requester owns the given tenant's data.
    pub fn owns(&self, tenant_id: TenantId) -> bool {
        self.tenant_id == tenant_id
    }
}
