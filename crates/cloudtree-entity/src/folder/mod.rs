//! Folder records.

pub mod model;

pub use model::{CreateFolder, Folder};
