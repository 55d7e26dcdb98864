//! # cloudtree-storage
//!
//! Byte store implementations for CloudTree: local filesystem and
//! in-memory.

pub mod manager;
pub mod providers;

pub use manager::open_byte_store;
pub use providers::{LocalByteStore, MemoryByteStore};
