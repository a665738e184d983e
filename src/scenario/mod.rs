//! The predefined scenarios.
//!
//! - `plain`: the bare network, nothing configured.
//! - `basic`: interface and loopback addresses from the topology, no daemons.
//! - `isis`: zebra, staticd and isisd on every router, configured from
//!   `<topo_dir>/isis/<daemon>/<node>.conf`.

pub mod descriptor;

use crate::emulator::Network;
use crate::error::{LabError, LabResult};
use crate::process::daemon::{DaemonLauncher, DAEMON_ORDER};
use crate::topology::TopologyDescriptor;
use log::{debug, info};
use std::fmt;
use std::path::Path;

pub use descriptor::{DaemonAssignment, ScenarioDescriptor};

/// Scenarios selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ScenarioKind {
    Plain,
    Basic,
    Isis,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Plain => "plain",
            ScenarioKind::Basic => "basic",
            ScenarioKind::Isis => "isis",
        }
    }

    /// Daemon placement for this scenario on `topology`
    pub fn descriptor(&self, topology: &TopologyDescriptor) -> ScenarioDescriptor {
        match self {
            ScenarioKind::Plain | ScenarioKind::Basic => ScenarioDescriptor::empty(),
            ScenarioKind::Isis => {
                let routers: Vec<&str> = topology.routers().map(|r| r.name.as_str()).collect();
                let isis_dir = topology.topo_dir.join(self.as_str());
                DAEMON_ORDER
                    .into_iter()
                    .fold(ScenarioDescriptor::empty(), |scenario, daemon| {
                        scenario.with_daemon(daemon, routers.iter().copied(), isis_dir.join(daemon.as_str()))
                    })
            }
        }
    }

    /// Prepare the running network before any daemon starts.
    ///
    /// `config_dir` is the topology's configuration directory.
    pub fn setup(&self, net: &mut dyn Network, config_dir: &Path) -> LabResult<()> {
        info!("Setting up scenario {}", self);
        match self {
            ScenarioKind::Plain => Ok(()),
            ScenarioKind::Basic => assign_addresses(net),
            ScenarioKind::Isis => {
                let nodes: Vec<String> = net
                    .nodes()
                    .iter()
                    .filter(|n| n.is_switch())
                    .map(|n| n.name.clone())
                    .collect();
                let isis_dir = config_dir.join(self.as_str());
                for daemon in DAEMON_ORDER {
                    for node in &nodes {
                        let path = DaemonLauncher::config_file(&isis_dir.join(daemon.as_str()), node);
                        if !path.is_file() {
                            return Err(LabError::MissingConfig { path });
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Put the topology's link and loopback addresses on the interfaces
fn assign_addresses(net: &mut dyn Network) -> LabResult<()> {
    let mut commands: Vec<(String, String)> = Vec::new();
    for link in net.links() {
        for end in link.endpoints() {
            if let Some(addr) = &end.addr {
                commands.push((end.node.clone(), format!("ip addr add {} dev {}", addr, end.intf)));
            }
        }
    }
    for node in net.nodes() {
        if let Some(addr) = &node.loopback {
            commands.push((node.name.clone(), format!("ip addr add {} dev lo", addr)));
        }
    }

    for (node, command) in commands {
        debug!("{}: {}", node, command);
        net.cmd(&node, &command)?.check("ip")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::fake::FakeNetwork;
    use crate::process::types::Daemon;
    use crate::topology::TopologyKind;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;

    #[test]
    fn test_names() {
        assert_eq!(ScenarioKind::Plain.to_string(), "plain");
        assert_eq!(ScenarioKind::Isis.as_str(), "isis");
    }

    #[test]
    fn test_plain_and_basic_assign_no_daemons() {
        let topo = TopologyKind::TwoNodes.build(Path::new("topology"));
        assert!(ScenarioKind::Plain.descriptor(&topo).is_empty());
        assert!(ScenarioKind::Basic.descriptor(&topo).is_empty());
    }

    #[test]
    fn test_isis_assigns_all_routers() {
        let topo = TopologyKind::TwoNodes.build(Path::new("topology"));
        let scenario = ScenarioKind::Isis.descriptor(&topo);

        for daemon in [Daemon::Zebra, Daemon::Staticd, Daemon::Isisd] {
            assert!(scenario.runs(daemon, "R1"));
            assert!(scenario.runs(daemon, "R2"));
        }
        assert!(!scenario.runs(Daemon::Ospfd, "R1"));
        assert_eq!(
            scenario.conf_dir(Daemon::Staticd),
            Some(Path::new("topology/two_nodes/isis/staticd"))
        );
        assert!(scenario.validate_against(&topo).is_ok());
    }

    #[test]
    fn test_basic_setup_assigns_addresses() {
        let topo = TopologyKind::TwoNodes.build(Path::new("topology"));
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut net = FakeNetwork::new(&topo, journal.clone());

        ScenarioKind::Basic.setup(&mut net, &topo.topo_dir).unwrap();
        assert_eq!(
            *journal.borrow(),
            vec![
                "R1: ip addr add 10.0.0.1/30 dev R1-eth0",
                "R2: ip addr add 10.0.0.2/30 dev R2-eth0",
                "R1: ip addr add 1.1.1.1/32 dev lo",
                "R2: ip addr add 2.2.2.2/32 dev lo",
            ]
        );
    }

    #[test]
    fn test_basic_setup_failure_is_fatal() {
        let topo = TopologyKind::OneNode.build(Path::new("topology"));
        let mut net = FakeNetwork::new(&topo, Rc::new(RefCell::new(Vec::new())));
        net.fail_on = Some("dev lo".to_string());

        let result = ScenarioKind::Basic.setup(&mut net, &topo.topo_dir);
        assert!(matches!(result, Err(LabError::Command(_))));
    }

    #[test]
    fn test_isis_setup_requires_config_files() {
        let root = tempfile::tempdir().unwrap();
        let topo = TopologyKind::TwoNodes.build(root.path());
        let mut net = FakeNetwork::new(&topo, Rc::new(RefCell::new(Vec::new())));

        let result = ScenarioKind::Isis.setup(&mut net, &topo.topo_dir);
        assert!(matches!(result, Err(LabError::MissingConfig { .. })));

        for daemon in ["zebra", "staticd", "isisd"] {
            let dir = topo.topo_dir.join("isis").join(daemon);
            fs::create_dir_all(&dir).unwrap();
            for node in ["R1", "R2"] {
                fs::write(dir.join(format!("{}.conf", node)), "!\n").unwrap();
            }
        }
        ScenarioKind::Isis.setup(&mut net, &topo.topo_dir).unwrap();
    }
}
