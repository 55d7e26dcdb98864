//! Core type definitions used across the CloudTree workspace.

pub mod id;
pub mod storage_key;

pub use id::*;
pub use storage_key::StorageKey;
