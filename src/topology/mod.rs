//! Network topology module.
//!
//! Descriptions of the predefined networks: which nodes exist, how they are
//! linked and where their scenario configuration lives.

pub mod catalog;
pub mod types;

// Re-export key types for easier access
pub use catalog::TopologyKind;
pub use types::{Endpoint, LinkSpec, NodeRole, NodeSpec, TopologyDescriptor};
