//! Trash records.

pub mod model;

pub use model::{CreateTrashRecord, TrashRecord};
