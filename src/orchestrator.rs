//! Scenario orchestrator.
//!
//! This module runs one scenario on one topology from start to finish:
//!
//! 1. **Validation**: the topology must support the scenario, and every node
//!    the scenario names must exist in the topology. Nothing runs otherwise.
//! 2. **Cleanup**: stale pid/log/output files, leftover emulator state and
//!    leftover daemons are removed. Best-effort, never aborts the run.
//! 3. **Instantiate**: the emulator builds and starts the network. Fatal.
//! 4. **Scenario setup**: the scenario prepares the live network. Fatal.
//! 5. **Daemon startup**: per switch node, daemons start in [`DAEMON_ORDER`].
//!    All daemons of one node start before the next node is visited. A
//!    daemon that fails to spawn is reported and skipped.
//! 6. **Router post-configuration**: IP forwarding on, loopback `/8` removed.
//! 7. **Interactive phase**: the console runs until the operator leaves.
//! 8. **Teardown**: the network is stopped and the daemons are killed. This
//!    runs from a drop guard, so it also happens after an error or a panic.
//!
//! An [`Interrupt`] raised before the interactive phase ends the run with
//! [`LabError::Interrupted`](crate::error::LabError::Interrupted) at the next step boundary, after teardown.
//!
//! Only one run per host at a time is supported: runs share the runtime
//! directory and kill daemons by name.

use crate::config::Config;
use crate::console::Console;
use crate::emulator::{Emulator, Network};
use crate::error::LabResult;
use crate::process::daemon::{DaemonLauncher, DAEMON_ORDER};
use crate::process::types::Daemon;
use crate::scenario::{ScenarioDescriptor, ScenarioKind};
use crate::topology::{NodeRole, TopologyKind};
use crate::utils::cleanup::{remove_artifacts, CleanupReport};
use crate::utils::command::CommandRunner;
use crate::utils::interrupt::Interrupt;
use log::{debug, info, warn};
use std::ffi::OsStr;
use std::path::PathBuf;

/// Commands run on every router after its daemons were started
pub const ROUTER_POST_CONFIG: [&str; 2] = [
    "sysctl -w net.ipv4.ip_forward=1",
    "ip addr del 127.0.0.1/8 dev lo",
];

const KILLALL: &str = "killall";

/// What happened during one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Stale artifacts removed during cleanup
    pub removed_artifacts: Vec<PathBuf>,
    /// Cleanup steps that failed and were ignored
    pub cleanup_failures: Vec<String>,
    /// Daemons started, in start order
    pub launched: Vec<(String, Daemon)>,
    /// Daemons that could not be spawned
    pub failed: Vec<(String, Daemon)>,
}

/// Runs scenarios against an emulator
pub struct Orchestrator<'a> {
    config: &'a Config,
    emulator: &'a dyn Emulator,
    runner: &'a dyn CommandRunner,
    interrupt: Interrupt,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a Config, emulator: &'a dyn Emulator, runner: &'a dyn CommandRunner) -> Self {
        Self {
            config,
            emulator,
            runner,
            interrupt: Interrupt::new(),
        }
    }

    /// Stop at the next step boundary once `interrupt` is raised
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Run `scenario` on `topology`, handing the live network to `console`.
    pub fn run(
        &self,
        topology: TopologyKind,
        scenario: ScenarioKind,
        console: &mut dyn Console,
    ) -> LabResult<RunSummary> {
        topology.ensure_supported(scenario)?;

        let topo = topology.build(&self.config.topology_root);
        let descriptor = scenario.descriptor(&topo);
        descriptor.validate_against(&topo)?;

        info!("Running scenario {} on topology {}", scenario, topology);
        let mut summary = RunSummary::default();

        let report = self.cleanup(&mut summary);
        report.log("Cleanup");
        summary.cleanup_failures = report.failures().to_vec();

        // From here on, teardown runs however this function is left.
        let mut teardown = Teardown::new(self.runner);
        self.interrupt.check()?;

        info!("Starting network");
        let net = teardown.manage(self.emulator.start(&topo)?);
        self.interrupt.check()?;

        scenario.setup(net, &topo.topo_dir)?;
        self.interrupt.check()?;

        self.start_daemons(net, &descriptor, &mut summary)?;
        self.configure_routers(net);
        self.interrupt.check()?;

        info!("Network ready, entering interactive phase");
        console.interact(net)?;

        drop(teardown);
        info!(
            "Run finished: {} daemons started, {} failed",
            summary.launched.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    /// Remove everything a previous run may have left behind.
    ///
    /// Each step runs regardless of the others; failures end up in the report.
    pub fn cleanup(&self, summary: &mut RunSummary) -> CleanupReport {
        info!("Cleaning up previous run state");
        let mut report = CleanupReport::new();

        let prefixes: Vec<&str> = NodeRole::ALL.iter().map(NodeRole::name_prefix).collect();
        summary.removed_artifacts = remove_artifacts(&self.config.runtime_dir, &prefixes, &mut report);

        report.attempt("emulator cleanup", self.emulator.cleanup());
        report.merge(kill_daemons(self.runner));
        report
    }

    fn start_daemons(
        &self,
        net: &mut dyn Network,
        scenario: &ScenarioDescriptor,
        summary: &mut RunSummary,
    ) -> LabResult<()> {
        let launcher = DaemonLauncher::from_config(self.config);

        // The network hands out its nodes; copy the names so it can be
        // borrowed mutably while launching.
        let switches: Vec<String> = net
            .nodes()
            .iter()
            .filter(|n| n.is_switch())
            .map(|n| n.name.clone())
            .collect();

        for node in switches {
            for daemon in DAEMON_ORDER {
                if !scenario.runs(daemon, &node) {
                    continue;
                }
                let Some(conf_dir) = scenario.conf_dir(daemon) else {
                    continue;
                };
                self.interrupt.check()?;
                match launcher.launch(net, &node, daemon, conf_dir) {
                    Ok(()) => summary.launched.push((node.clone(), daemon)),
                    Err(e) => {
                        warn!("{}", e);
                        summary.failed.push((node.clone(), daemon));
                    }
                }
            }
        }
        Ok(())
    }

    fn configure_routers(&self, net: &mut dyn Network) {
        let routers: Vec<String> = net
            .nodes()
            .iter()
            .filter(|n| NodeRole::is_router_name(&n.name))
            .map(|n| n.name.clone())
            .collect();

        for router in routers {
            for command in ROUTER_POST_CONFIG {
                match net.cmd(&router, command) {
                    Ok(out) if out.success() => {}
                    Ok(out) => warn!("{}: `{}` exited with status {}", router, command, out.code),
                    Err(e) => warn!("{}: `{}` failed: {}", router, command, e),
                }
            }
        }
    }
}

/// Kill every daemon of [`DAEMON_ORDER`] by name
fn kill_daemons(runner: &dyn CommandRunner) -> CleanupReport {
    let mut args = vec!["-9".to_string()];
    args.extend(DAEMON_ORDER.iter().map(|d| d.to_string()));

    let mut report = CleanupReport::new();
    if let Some(out) = report.attempt("kill daemons", runner.run(OsStr::new(KILLALL), &args)) {
        // killall exits non-zero when nothing matched, which is the common case
        if !out.success() {
            debug!("killall: {}", out.stderr.trim());
        }
    }
    report
}

/// Stops the network and kills the daemons when dropped
struct Teardown<'a> {
    net: Option<Box<dyn Network>>,
    runner: &'a dyn CommandRunner,
}

impl<'a> Teardown<'a> {
    fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { net: None, runner }
    }

    fn manage(&mut self, net: Box<dyn Network>) -> &mut dyn Network {
        &mut **self.net.insert(net)
    }
}

impl Drop for Teardown<'_> {
    fn drop(&mut self) {
        info!("Tearing down");
        let mut report = CleanupReport::new();
        if let Some(net) = self.net.as_mut() {
            report.attempt("stop network", net.stop());
        }
        report.merge(kill_daemons(self.runner));
        report.log("Teardown");
    }
}
