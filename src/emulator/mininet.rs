//! Mininet driver.
//!
//! Nodes are created the way Mininet creates them: an interactive shell in
//! fresh namespaces, started through `mnexec` with the marker argument
//! `mininet:<node>`. That marker is what the process locator (and the attach
//! tool) later searches for. Links are veth pairs moved into the namespaces
//! of their nodes.

use crate::emulator::{Emulator, Network, Node};
use crate::error::{LabError, LabResult};
use crate::process::locator::{locate_all, ProcessTable};
use crate::topology::{LinkSpec, TopologyDescriptor};
use crate::utils::cleanup::CleanupReport;
use crate::utils::command::{CommandOutput, CommandRunner};
use log::{debug, info, warn};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

const LOCATE_RETRY: Duration = Duration::from_millis(20);

/// Arguments of the node shell, without the `mininet:<node>` marker
pub const SHELL_ARGS: [&str; 4] = ["bash", "--norc", "--noediting", "-is"];

/// Spawns Mininet-style networks on the local host
pub struct MininetEmulator {
    mnexec: PathBuf,
    mn: PathBuf,
    runner: Rc<dyn CommandRunner>,
    table: Rc<dyn ProcessTable>,
    node_start_timeout: Duration,
}

impl MininetEmulator {
    pub fn new(
        mnexec: impl Into<PathBuf>,
        mn: impl Into<PathBuf>,
        runner: Rc<dyn CommandRunner>,
        table: Rc<dyn ProcessTable>,
        node_start_timeout: Duration,
    ) -> Self {
        Self {
            mnexec: mnexec.into(),
            mn: mn.into(),
            runner,
            table,
            node_start_timeout,
        }
    }

    /// Start the shell of one node and wait until it shows up in the process table.
    fn spawn_node(&self, name: &str) -> LabResult<(Child, u32)> {
        let marker = format!("mininet:{}", name);
        debug!("Starting node shell for {}", name);
        let mut child = Command::new(&self.mnexec)
            .arg("-cdn")
            .args(SHELL_ARGS)
            .arg(&marker)
            // the shell lives as long as its stdin stays open
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                LabError::Emulator(format!("cannot start node {}: {}", name, e))
            })?;

        // Only the shell spawned here counts: a leftover shell of an earlier
        // network may carry the same marker. mnexec execs the shell in place,
        // so both share a pid.
        let pid = child.id();
        let deadline = Instant::now() + self.node_start_timeout;
        loop {
            let found = match locate_all(self.table.as_ref(), name) {
                Ok(found) => found,
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e);
                }
            };
            if found.iter().any(|record| record.pid == pid) {
                if found.len() > 1 {
                    warn!(
                        "Ignoring {} leftover shell(s) for node {}",
                        found.len() - 1,
                        name
                    );
                }
                return Ok((child, pid));
            }

            if let Ok(Some(status)) = child.try_wait() {
                return Err(LabError::Emulator(format!(
                    "node {} exited during startup ({})",
                    name, status
                )));
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(LabError::Emulator(format!(
                    "node {} did not come up as pid {} within {:?}",
                    name, pid, self.node_start_timeout
                )));
            }
            thread::sleep(LOCATE_RETRY);
        }
    }

    fn host_cmd(&self, program: &str, args: &[String]) -> LabResult<CommandOutput> {
        Ok(self.runner.run(OsStr::new(program), args)?.check(program)?)
    }

    fn create_link(&self, net: &mut MininetNetwork, link: &LinkSpec) -> LabResult<()> {
        debug!("Creating link {}", link);
        self.host_cmd(
            "ip",
            &strings(&["link", "add", &link.a.intf, "type", "veth", "peer", "name", &link.b.intf]),
        )?;
        for end in link.endpoints() {
            let pid = net
                .node(&end.node)
                .map(|n| n.pid)
                .ok_or_else(|| LabError::Emulator(format!("link {} names unknown node {}", link, end.node)))?;
            self.host_cmd("ip", &strings(&["link", "set", &end.intf, "netns", &pid.to_string()]))?;
            net.cmd(&end.node, &format!("ip link set {} up", end.intf))?
                .check("ip")?;
        }
        Ok(())
    }
}

impl Emulator for MininetEmulator {
    fn cleanup(&self) -> LabResult<()> {
        info!("Cleaning up stale emulator state");
        self.runner.run(self.mn.as_os_str(), &strings(&["-c"]))?;
        Ok(())
    }

    fn start(&self, topology: &TopologyDescriptor) -> LabResult<Box<dyn Network>> {
        info!(
            "Building topology {} ({} nodes, {} links)",
            topology.name,
            topology.nodes.len(),
            topology.links.len()
        );

        let mut net = MininetNetwork {
            mnexec: self.mnexec.clone(),
            runner: Rc::clone(&self.runner),
            nodes: Vec::new(),
            links: topology.links.clone(),
            shells: Vec::new(),
            stopped: false,
        };

        // On any error below, dropping `net` kills the shells started so far.
        for spec in &topology.nodes {
            let (child, pid) = self.spawn_node(&spec.name)?;
            net.shells.push(child);
            net.nodes.push(Node {
                name: spec.name.clone(),
                role: spec.role,
                pid,
                loopback: spec.loopback.clone(),
            });
            net.cmd(&spec.name, "ip link set lo up")?.check("ip")?;
        }

        for link in &topology.links {
            self.create_link(&mut net, link)?;
        }

        info!("Network {} is up", topology.name);
        Ok(Box::new(net))
    }
}

/// A running Mininet-style network
pub struct MininetNetwork {
    mnexec: PathBuf,
    runner: Rc<dyn CommandRunner>,
    nodes: Vec<Node>,
    links: Vec<LinkSpec>,
    shells: Vec<Child>,
    stopped: bool,
}

impl MininetNetwork {
    fn kill_shells(&mut self) -> CleanupReport {
        let mut report = CleanupReport::new();
        for mut shell in self.shells.drain(..) {
            // closing stdin ends the interactive shell
            drop(shell.stdin.take());
            if let Ok(None) = shell.try_wait() {
                report.attempt(&format!("kill shell {}", shell.id()), shell.kill());
            }
            report.attempt(&format!("reap shell {}", shell.id()), shell.wait());
        }
        report
    }
}

impl Network for MininetNetwork {
    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn links(&self) -> &[LinkSpec] {
        &self.links
    }

    fn cmd(&mut self, node: &str, command: &str) -> LabResult<CommandOutput> {
        let pid = self
            .node(node)
            .map(|n| n.pid)
            .ok_or_else(|| LabError::NodeNotRunning {
                node: node.to_string(),
            })?;
        let args = strings(&["-a", &pid.to_string(), "sh", "-c", command]);
        Ok(self.runner.run(self.mnexec.as_os_str(), &args)?)
    }

    fn stop(&mut self) -> LabResult<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        info!("Stopping network ({} nodes)", self.nodes.len());

        let report = self.kill_shells();
        if report.is_clean() {
            Ok(())
        } else {
            Err(LabError::Emulator(report.failures().join("; ")))
        }
    }
}

impl Drop for MininetNetwork {
    fn drop(&mut self) {
        if !self.shells.is_empty() {
            warn!("Network dropped while running, killing {} node shells", self.shells.len());
            self.kill_shells().log("Node shell cleanup");
        }
    }
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
