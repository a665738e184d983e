//! FRR daemon startup inside emulated nodes.
//!
//! Each daemon is started in the background from the node's shell with a
//! per-node configuration file. Its pid file and its output go to predictable
//! paths in the runtime directory:
//!
//! ```text
//! <runtime_dir>/<node>-<daemon>.pid
//! <runtime_dir>/<node>-<daemon>.out
//! ```
//!
//! There is no readiness check. A daemon that fails after forking is only
//! visible in its `.out` file.

use crate::config::Config;
use crate::emulator::Network;
use crate::error::{LabError, LabResult};
use crate::process::types::Daemon;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Startup order of the daemons on one node. zebra must come first.
pub const DAEMON_ORDER: [Daemon; 3] = [Daemon::Zebra, Daemon::Staticd, Daemon::Isisd];

/// Starts daemons inside nodes of a running network
#[derive(Debug, Clone)]
pub struct DaemonLauncher {
    frr_bin_dir: PathBuf,
    runtime_dir: PathBuf,
}

impl DaemonLauncher {
    pub fn new(frr_bin_dir: impl Into<PathBuf>, runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            frr_bin_dir: frr_bin_dir.into(),
            runtime_dir: runtime_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.frr_bin_dir, &config.runtime_dir)
    }

    pub fn pid_file(&self, node: &str, daemon: Daemon) -> PathBuf {
        self.runtime_dir.join(format!("{}-{}.pid", node, daemon))
    }

    pub fn output_file(&self, node: &str, daemon: Daemon) -> PathBuf {
        self.runtime_dir.join(format!("{}-{}.out", node, daemon))
    }

    pub fn config_file(conf_dir: &Path, node: &str) -> PathBuf {
        conf_dir.join(format!("{}.conf", node))
    }

    /// Shell command starting `daemon` for `node`
    pub fn command_line(&self, node: &str, daemon: Daemon, conf_dir: &Path) -> String {
        format!(
            "{} -f {} -d -i {} > {} 2>&1",
            shell_quote(&self.frr_bin_dir.join(daemon.as_str())),
            shell_quote(&Self::config_file(conf_dir, node)),
            shell_quote(&self.pid_file(node, daemon)),
            shell_quote(&self.output_file(node, daemon)),
        )
    }

    /// Start `daemon` inside `node`.
    ///
    /// Returns once the daemon has been spawned; daemon-internal failures are
    /// only visible in its output file.
    pub fn launch(
        &self,
        net: &mut dyn Network,
        node: &str,
        daemon: Daemon,
        conf_dir: &Path,
    ) -> LabResult<()> {
        let command = self.command_line(node, daemon, conf_dir);
        info!("Starting {} on {}", daemon, node);
        debug!("{}: {}", node, command);

        let spawn_failed = |reason: String| LabError::SpawnFailed {
            node: node.to_string(),
            daemon: daemon.to_string(),
            log: self.output_file(node, daemon),
            reason,
        };

        let output = net
            .cmd(node, &command)
            .map_err(|e| spawn_failed(e.to_string()))?;
        if !output.success() {
            return Err(spawn_failed(format!("exited with status {}", output.code)));
        }

        Ok(())
    }
}

/// Quote a path for `sh -c` unless it only holds safe characters
fn shell_quote(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let safe = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:,=@".contains(c));
    if safe {
        raw.into_owned()
    } else {
        format!("'{}'", raw.replace('\'', r"'\''"))
    }
}
