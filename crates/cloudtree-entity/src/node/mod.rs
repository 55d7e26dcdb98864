//! The closed Folder | File variant set and its addressing types.

pub mod kind;
pub mod model;

pub use kind::{NodeFlag, NodeId, NodeKind};
pub use model::Node;
