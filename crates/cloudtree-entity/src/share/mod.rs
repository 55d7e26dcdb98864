//! Share records and access modes.

pub mod model;

pub use model::{AccessMode, ShareAction, ShareRecord, ShareSettings};
