//! Core traits defined in `cloudtree-core` and implemented by other crates.

pub mod storage;

pub use storage::{ByteStore, ByteStream};
