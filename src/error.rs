//! Error taxonomy shared by the attach tool and the scenario runner.

use crate::config::ConfigError;
use crate::utils::command::CommandError;
use std::path::PathBuf;

/// Errors raised by node discovery, attaching, daemon launching and
/// scenario orchestration.
#[derive(Debug, thiserror::Error)]
pub enum LabError {
    /// No live shell process carries the `mininet:<node>` token.
    #[error("No process found for node `{node}`; is the network running?")]
    NodeNotRunning { node: String },

    /// The daemon name is not part of the well-known control port table.
    #[error("Unknown daemon `{name}` (known daemons: {known})")]
    UnknownDaemon { name: String, known: String },

    /// Joining the target process context, or running the command in it, failed.
    #[error("Failed to attach to process {pid}: {reason}")]
    AttachFailed { pid: u32, reason: String },

    /// The topology does not support the requested scenario.
    #[error("Scenario \"{scenario}\" is not supported for topology \"{topology}\"")]
    UnsupportedScenario { scenario: String, topology: String },

    /// A routing daemon could not be started inside its node.
    #[error("Failed to start {daemon} on {node} (see {}): {reason}", log.display())]
    SpawnFailed {
        node: String,
        daemon: String,
        log: PathBuf,
        reason: String,
    },

    /// A scenario references a node the topology does not create.
    #[error("Scenario assigns {daemon} to node `{node}` which topology \"{topology}\" does not create")]
    UnknownNode {
        node: String,
        daemon: String,
        topology: String,
    },

    /// A scenario needs a configuration file that does not exist.
    #[error("Missing configuration file {}", path.display())]
    MissingConfig { path: PathBuf },

    /// The emulated network could not be instantiated.
    #[error("Emulator error: {0}")]
    Emulator(String),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The operator interrupted the run (SIGINT, SIGTERM or SIGQUIT).
    #[error("Interrupted")]
    Interrupted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the library.
pub type LabResult<T> = Result<T, LabError>;
