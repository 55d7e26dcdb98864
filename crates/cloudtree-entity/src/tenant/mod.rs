//! Tenant records and quota value objects.

pub mod model;
pub mod quota;

pub use model::{CreateTenant, Tenant};
pub use quota::{QuotaUsage, UsageAdjustment};
