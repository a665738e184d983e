//! Interactive sessions inside a running node.
//!
//! Attaching joins the namespaces of the node's shell with `mnexec -a <pid>`
//! and runs a command there with the caller's terminal. For a daemon the
//! command is a telnet session to its vty port on `localhost`.

use crate::error::{LabError, LabResult};
use crate::process::locator::ProcessTable;
use crate::process::types::Daemon;
use crate::utils::command::exit_code;
use log::{debug, info};
use std::path::PathBuf;
use std::process::Command;

/// Command run when nothing else is requested
pub const DEFAULT_COMMAND: &str = "sh";

/// What to run once inside the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachTarget {
    /// A literal command, `argv[0]` first
    Command(Vec<String>),
    /// A daemon name, resolved through the control port table
    Daemon(String),
}

impl Default for AttachTarget {
    fn default() -> Self {
        AttachTarget::Command(vec![DEFAULT_COMMAND.to_string()])
    }
}

/// Look up the control port of a daemon by name
pub fn control_port(daemon: &str) -> LabResult<u16> {
    Ok(daemon.parse::<Daemon>()?.port())
}

/// Opens interactive sessions in node processes
pub struct SessionAttacher<'a> {
    mnexec: PathBuf,
    table: &'a dyn ProcessTable,
}

impl<'a> SessionAttacher<'a> {
    pub fn new(mnexec: impl Into<PathBuf>, table: &'a dyn ProcessTable) -> Self {
        Self {
            mnexec: mnexec.into(),
            table,
        }
    }

    /// Arguments passed to `mnexec` to run `target` inside the context of `pid`.
    ///
    /// # Arguments
    /// * `pid` - Process id of the node shell, as returned by the locator
    /// * `target` - Command or daemon to open
    ///
    /// # Returns
    /// `UnknownDaemon` if `target` names a daemon outside the port table
    pub fn session_args(&self, pid: u32, target: &AttachTarget) -> LabResult<Vec<String>> {
        let mut args = vec!["-a".to_string(), pid.to_string()];
        match target {
            AttachTarget::Daemon(name) => {
                let port = control_port(name)?;
                args.extend(["telnet".to_string(), "localhost".to_string(), port.to_string()]);
            }
            AttachTarget::Command(argv) if argv.is_empty() => args.push(DEFAULT_COMMAND.to_string()),
            AttachTarget::Command(argv) => args.extend(argv.iter().cloned()),
        }
        Ok(args)
    }

    /// Run `target` inside the node with inherited terminal I/O.
    ///
    /// Blocks until the session ends and returns its exit code, which the
    /// caller is expected to exit with.
    pub fn attach(&self, pid: u32, target: &AttachTarget) -> LabResult<i32> {
        let args = self.session_args(pid, target)?;

        // The node may have gone away since it was located.
        if !self.table.is_alive(pid) {
            return Err(LabError::AttachFailed {
                pid,
                reason: "process is no longer running".to_string(),
            });
        }

        info!("Attaching to pid {}", pid);
        debug!("Running: {} {}", self.mnexec.display(), args.join(" "));

        let status = Command::new(&self.mnexec)
            .args(&args)
            .status()
            .map_err(|e| LabError::AttachFailed {
                pid,
                reason: format!("cannot run {}: {}", self.mnexec.display(), e),
            })?;

        // A failed namespace join and the session's own exit look the same here.
        debug!("{} -a {} exited with {}", self.mnexec.display(), pid, status);
        Ok(exit_code(status))
    }
}
