//! Process handling module.
//!
//! Locating node shells in the process table, attaching interactive
//! sessions to them, and starting FRR daemons inside nodes.

pub mod attach;
pub mod daemon;
pub mod locator;
pub mod types;

// Re-export commonly used items for convenience
pub use attach::{AttachTarget, SessionAttacher};
pub use daemon::{DaemonLauncher, DAEMON_ORDER};
pub use locator::{locate, locate_all, ProcFs, ProcessTable};
pub use types::{Daemon, ProcessEntry, ProcessRecord};
