//! Topology type definitions.
//!
//! A [`TopologyDescriptor`] is the graph handed to the emulator: named nodes,
//! point-to-point links between their interfaces, and the directory holding
//! the scenario configuration files for this topology.

use std::fmt;
use std::path::PathBuf;

/// Role of a node in the emulated network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Runs routing daemons; named `R<n>`
    Router,
    /// Plain end host; named `h<n>`
    Host,
}

impl NodeRole {
    pub const ALL: [NodeRole; 2] = [NodeRole::Router, NodeRole::Host];

    /// First characters of the names of nodes with this role
    pub fn name_prefix(&self) -> &'static str {
        match self {
            NodeRole::Router => "R",
            NodeRole::Host => "h",
        }
    }

    /// Routers are identified by their name
    pub fn is_router_name(name: &str) -> bool {
        name.starts_with(NodeRole::Router.name_prefix())
    }
}

/// A node to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub name: String,
    pub role: NodeRole,
    /// Address for the loopback interface, e.g. `1.1.1.1/32`
    pub loopback: Option<String>,
}

impl NodeSpec {
    pub fn router(name: &str, loopback: &str) -> Self {
        Self {
            name: name.to_string(),
            role: NodeRole::Router,
            loopback: Some(loopback.to_string()),
        }
    }
}

/// One side of a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub node: String,
    pub intf: String,
    /// Interface address in CIDR notation
    pub addr: Option<String>,
}

/// A point-to-point link between two node interfaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    pub a: Endpoint,
    pub b: Endpoint,
}

impl LinkSpec {
    pub fn endpoints(&self) -> [&Endpoint; 2] {
        [&self.a, &self.b]
    }
}

impl fmt::Display for LinkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} <-> {}:{}", self.a.node, self.a.intf, self.b.node, self.b.intf)
    }
}

/// Everything the emulator needs to build one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyDescriptor {
    pub name: String,
    pub nodes: Vec<NodeSpec>,
    pub links: Vec<LinkSpec>,
    /// Directory with the scenario configuration files of this topology
    pub topo_dir: PathBuf,
}

impl TopologyDescriptor {
    pub fn node(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.node(name).is_some()
    }

    pub fn routers(&self) -> impl Iterator<Item = &NodeSpec> {
        self.nodes.iter().filter(|n| n.role == NodeRole::Router)
    }
}
