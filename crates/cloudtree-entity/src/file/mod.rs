//! File records.

pub mod model;

pub use model::{CreateFile, File, split_file_name};
