//! Cluster membership as seen by a single node.

pub mod identity;

pub use identity::{matches, NodeIdentity};
