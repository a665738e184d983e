//! Node process discovery.
//!
//! The emulator starts every node as an interactive shell whose command line
//! ends in the token `mininet:<node>`. Locating a node means scanning the live
//! process table for that shell. Results are never cached: the table is read
//! again on every call.

use crate::error::{LabError, LabResult};
use crate::process::types::{ProcessEntry, ProcessRecord};
use log::debug;
use regex::Regex;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Read-only view of the OS process table.
pub trait ProcessTable {
    /// All live processes, in enumeration order
    fn processes(&self) -> io::Result<Vec<ProcessEntry>>;

    /// Whether `pid` is still alive
    fn is_alive(&self, pid: u32) -> bool;
}

/// Process table backed by a procfs mount (usually `/proc`)
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_cmdline(&self, pid: u32) -> Option<Vec<String>> {
        let raw = fs::read(self.root.join(pid.to_string()).join("cmdline")).ok()?;
        let argv: Vec<String> = raw
            .split(|b| *b == 0)
            .filter(|arg| !arg.is_empty())
            .map(|arg| String::from_utf8_lossy(arg).into_owned())
            .collect();
        // kernel threads have an empty command line
        (!argv.is_empty()).then_some(argv)
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcessTable for ProcFs {
    fn processes(&self) -> io::Result<Vec<ProcessEntry>> {
        let mut pids: Vec<u32> = fs::read_dir(&self.root)?
            .flatten()
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .collect();
        pids.sort_unstable();

        // A process may exit between listing and reading; skip it.
        Ok(pids
            .into_iter()
            .filter_map(|pid| {
                self.read_cmdline(pid)
                    .map(|argv| ProcessEntry { pid, argv })
            })
            .collect())
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.root.join(pid.to_string()).is_dir()
    }
}

/// Build the matcher for the shell of `node`.
///
/// The token must be complete: `mininet:R1` does not match `mininet:R10`.
pub fn node_shell_pattern(node: &str) -> Regex {
    let pattern = format!(
        r"^(?:\S*/)?bash\s(?:.*\s)?mininet:{}(?:\s|$)",
        regex::escape(node)
    );
    Regex::new(&pattern).expect("escaped node name always forms a valid pattern")
}

/// Every shell process carrying the marker of `node`, in pid order.
///
/// More than one shows up when an earlier network was not cleaned up.
pub fn locate_all(table: &dyn ProcessTable, node: &str) -> LabResult<Vec<ProcessRecord>> {
    if node.is_empty() {
        return Ok(Vec::new());
    }

    let pattern = node_shell_pattern(node);
    Ok(table
        .processes()?
        .into_iter()
        .filter(|entry| pattern.is_match(&entry.command_line()))
        .map(|entry| ProcessRecord {
            node: node.to_string(),
            pid: entry.pid,
        })
        .collect())
}

/// Return the pid of the first shell process belonging to `node`.
pub fn locate(table: &dyn ProcessTable, node: &str) -> LabResult<ProcessRecord> {
    let record = locate_all(table, node)?
        .into_iter()
        .next()
        .ok_or_else(|| LabError::NodeNotRunning {
            node: node.to_string(),
        })?;

    debug!("Node {} runs as pid {}", record.node, record.pid);
    Ok(record)
}
