//! Emulated network seams.
//!
//! The orchestrator only talks to the emulator through [`Emulator`] (global
//! cleanup and instantiation) and [`Network`] (a running instance). The
//! [`mininet`] module drives the real thing.

pub mod mininet;

use crate::error::LabResult;
use crate::topology::{LinkSpec, NodeRole, TopologyDescriptor};
use crate::utils::command::CommandOutput;

pub use mininet::MininetEmulator;

/// A live node of a running network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub role: NodeRole,
    /// Pid of the node's shell
    pub pid: u32,
    /// Address for the loopback interface, if the topology assigns one
    pub loopback: Option<String>,
}

impl Node {
    /// Nodes that may run routing daemons
    pub fn is_switch(&self) -> bool {
        self.role == NodeRole::Router
    }
}

/// A running emulated network
pub trait Network {
    /// Nodes in creation order
    fn nodes(&self) -> &[Node];

    fn links(&self) -> &[LinkSpec];

    /// Run a shell command inside `node` and wait for it to finish
    fn cmd(&mut self, node: &str, command: &str) -> LabResult<CommandOutput>;

    /// Tear the network down. Calling it twice is harmless.
    fn stop(&mut self) -> LabResult<()>;

    fn node(&self, name: &str) -> Option<&Node> {
        self.nodes().iter().find(|n| n.name == name)
    }
}

/// Factory for emulated networks
pub trait Emulator {
    /// Remove whatever a previous instance left behind
    fn cleanup(&self) -> LabResult<()>;

    /// Build and start the network described by `topology`
    fn start(&self, topology: &TopologyDescriptor) -> LabResult<Box<dyn Network>>;
}
