//! Integration tests for the tree engine on the in-memory backends.

mod helpers;

mod copy_test;
mod quota_test;
mod share_test;
mod tenant_test;
mod trash_test;
mod tree_test;
