//! Which daemons run where.

use crate::error::{LabError, LabResult};
use crate::process::types::Daemon;
use crate::topology::TopologyDescriptor;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Nodes running one daemon, and the directory with their `<node>.conf` files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonAssignment {
    pub nodes: BTreeSet<String>,
    pub conf_dir: PathBuf,
}

/// Daemon placement of one scenario. Built once per run, never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioDescriptor {
    assignments: BTreeMap<Daemon, DaemonAssignment>,
}

impl ScenarioDescriptor {
    /// A scenario without daemons
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_daemon<I, S>(mut self, daemon: Daemon, nodes: I, conf_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assignments.insert(
            daemon,
            DaemonAssignment {
                nodes: nodes.into_iter().map(Into::into).collect(),
                conf_dir: conf_dir.into(),
            },
        );
        self
    }

    /// Whether `node` must run `daemon`
    pub fn runs(&self, daemon: Daemon, node: &str) -> bool {
        self.assignments
            .get(&daemon)
            .is_some_and(|a| a.nodes.contains(node))
    }

    pub fn conf_dir(&self, daemon: Daemon) -> Option<&Path> {
        self.assignments.get(&daemon).map(|a| a.conf_dir.as_path())
    }

    /// All `(daemon, node)` pairs, grouped by daemon
    pub fn assignments(&self) -> impl Iterator<Item = (Daemon, &str)> {
        self.assignments
            .iter()
            .flat_map(|(daemon, a)| a.nodes.iter().map(move |n| (*daemon, n.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.values().all(|a| a.nodes.is_empty())
    }

    /// Every node named here must be created by `topology`.
    pub fn validate_against(&self, topology: &TopologyDescriptor) -> LabResult<()> {
        match self.assignments().find(|(_, node)| !topology.has_node(node)) {
            Some((daemon, node)) => Err(LabError::UnknownNode {
                node: node.to_string(),
                daemon: daemon.to_string(),
                topology: topology.name.clone(),
            }),
            None => Ok(()),
        }
    }
}
