//! Runtime settings for the scenario runner and the attach tool.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields a working configuration for a stock Mininet + FRR installation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors found while validating a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: `{field}` cannot be empty")]
    EmptyPath { field: &'static str },

    #[error("Invalid configuration: `{field}` must be greater than zero")]
    ZeroDuration { field: &'static str },
}

/// Settings shared by both binaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the FRR daemon binaries
    pub frr_bin_dir: PathBuf,
    /// Directory receiving pid files and daemon output
    pub runtime_dir: PathBuf,
    /// Directory containing one sub-directory per topology
    pub topology_root: PathBuf,
    /// The emulator's namespace helper
    pub mnexec: PathBuf,
    /// The emulator's command-line tool, used for `mn -c`
    pub mn: PathBuf,
    /// Mount point of the process filesystem
    pub proc_root: PathBuf,
    /// Upper bound for every external command. `None` blocks until the command returns.
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub command_timeout: Option<Duration>,
    /// How long a freshly spawned node shell may take to show up in the process table
    #[serde(with = "humantime_serde")]
    pub node_start_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frr_bin_dir: PathBuf::from("/usr/lib/frr"),
            runtime_dir: PathBuf::from("/tmp"),
            topology_root: PathBuf::from("topology"),
            mnexec: PathBuf::from("mnexec"),
            mn: PathBuf::from("mn"),
            proc_root: PathBuf::from("/proc"),
            command_timeout: None,
            node_start_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let paths: [(&'static str, &Path); 6] = [
            ("frr_bin_dir", self.frr_bin_dir.as_path()),
            ("runtime_dir", self.runtime_dir.as_path()),
            ("topology_root", self.topology_root.as_path()),
            ("mnexec", self.mnexec.as_path()),
            ("mn", self.mn.as_path()),
            ("proc_root", self.proc_root.as_path()),
        ];
        for (field, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyPath { field });
            }
        }

        if self.node_start_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "node_start_timeout",
            });
        }
        if self.command_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroDuration {
                field: "command_timeout",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.command_timeout, None);
        assert_eq!(config.frr_bin_dir, PathBuf::from("/usr/lib/frr"));
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
frr_bin_dir: /opt/frr/sbin
command_timeout: 30s
node_start_timeout: 500ms
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.frr_bin_dir, PathBuf::from("/opt/frr/sbin"));
        assert_eq!(config.command_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.node_start_timeout, Duration::from_millis(500));
        // untouched keys keep their defaults
        assert_eq!(config.runtime_dir, PathBuf::from("/tmp"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reject_unknown_key() {
        let yaml = "frr_dir: /opt/frr\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_validate_empty_path() {
        let config = Config {
            runtime_dir: PathBuf::new(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyPath { field: "runtime_dir" })
        ));
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let config = Config {
            node_start_timeout: Duration::ZERO,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroDuration { field: "node_start_timeout" })
        ));

        let config = Config {
            command_timeout: Some(Duration::ZERO),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
