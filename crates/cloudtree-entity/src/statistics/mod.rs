//! Usage statistics value objects.

pub mod category;

pub use category::{Category, CategoryUsage};
