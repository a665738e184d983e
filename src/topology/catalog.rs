//! The predefined topologies.

use crate::error::{LabError, LabResult};
use crate::scenario::ScenarioKind;
use crate::topology::types::{Endpoint, LinkSpec, NodeSpec, TopologyDescriptor};
use std::fmt;
use std::path::Path;

/// Topologies selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum TopologyKind {
    /// A single router
    #[value(name = "one_node")]
    OneNode,
    /// Two routers joined by one link
    #[value(name = "two_nodes")]
    TwoNodes,
}

impl TopologyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyKind::OneNode => "one_node",
            TopologyKind::TwoNodes => "two_nodes",
        }
    }

    /// Scenarios that can run on this topology
    pub fn supported_scenarios(&self) -> &'static [ScenarioKind] {
        match self {
            TopologyKind::OneNode => &[ScenarioKind::Plain, ScenarioKind::Basic],
            TopologyKind::TwoNodes => &[ScenarioKind::Plain, ScenarioKind::Basic, ScenarioKind::Isis],
        }
    }

    pub fn supports(&self, scenario: ScenarioKind) -> bool {
        self.supported_scenarios().contains(&scenario)
    }

    /// Fail with `UnsupportedScenario` unless `scenario` can run here
    pub fn ensure_supported(&self, scenario: ScenarioKind) -> LabResult<()> {
        if self.supports(scenario) {
            Ok(())
        } else {
            Err(LabError::UnsupportedScenario {
                scenario: scenario.as_str().to_string(),
                topology: self.as_str().to_string(),
            })
        }
    }

    /// Describe the network; `topology_root` holds one directory per topology.
    pub fn build(&self, topology_root: &Path) -> TopologyDescriptor {
        let (nodes, links) = match self {
            TopologyKind::OneNode => (vec![NodeSpec::router("R1", "1.1.1.1/32")], Vec::new()),
            TopologyKind::TwoNodes => (
                vec![
                    NodeSpec::router("R1", "1.1.1.1/32"),
                    NodeSpec::router("R2", "2.2.2.2/32"),
                ],
                vec![link(("R1", 0, "10.0.0.1/30"), ("R2", 0, "10.0.0.2/30"))],
            ),
        };

        TopologyDescriptor {
            name: self.as_str().to_string(),
            nodes,
            links,
            topo_dir: topology_root.join(self.as_str()),
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn link(a: (&str, u32, &str), b: (&str, u32, &str)) -> LinkSpec {
    let endpoint = |(node, port, addr): (&str, u32, &str)| Endpoint {
        node: node.to_string(),
        intf: format!("{}-eth{}", node, port),
        addr: Some(addr.to_string()),
    };
    LinkSpec {
        a: endpoint(a),
        b: endpoint(b),
    }
}
