//! Byte store implementations.

pub mod local;
pub mod memory;

pub use local::LocalByteStore;
pub use memory::MemoryByteStore;
