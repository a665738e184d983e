//! Process and daemon type definitions.

use crate::error::LabError;
use std::fmt;
use std::str::FromStr;

/// One entry of the OS process table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Command-line arguments, `argv[0]` first
    pub argv: Vec<String>,
}

impl ProcessEntry {
    /// The command line as `ps` would show it
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

/// A node resolved to the process id of its shell. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub node: String,
    pub pid: u32,
}

/// FRR daemons reachable through a well-known vty port
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Daemon {
    ZebraServices,
    Zebra,
    Ripd,
    Ripngd,
    Ospfd,
    Bgpd,
    Ospf6d,
    Ospfapi,
    Isisd,
    Staticd,
}

impl Daemon {
    /// Every daemon of the port table, in port order
    pub const ALL: [Daemon; 10] = [
        Daemon::ZebraServices,
        Daemon::Zebra,
        Daemon::Ripd,
        Daemon::Ripngd,
        Daemon::Ospfd,
        Daemon::Bgpd,
        Daemon::Ospf6d,
        Daemon::Ospfapi,
        Daemon::Isisd,
        Daemon::Staticd,
    ];

    /// Name of the daemon, which is also its binary name
    pub fn as_str(&self) -> &'static str {
        match self {
            Daemon::ZebraServices => "zebrasrv",
            Daemon::Zebra => "zebra",
            Daemon::Ripd => "ripd",
            Daemon::Ripngd => "ripngd",
            Daemon::Ospfd => "ospfd",
            Daemon::Bgpd => "bgpd",
            Daemon::Ospf6d => "ospf6d",
            Daemon::Ospfapi => "ospfapi",
            Daemon::Isisd => "isisd",
            Daemon::Staticd => "staticd",
        }
    }

    /// Well-known control port. These numbers are fixed by FRR.
    pub fn port(&self) -> u16 {
        match self {
            Daemon::ZebraServices => 2600,
            Daemon::Zebra => 2601,
            Daemon::Ripd => 2602,
            Daemon::Ripngd => 2603,
            Daemon::Ospfd => 2604,
            Daemon::Bgpd => 2605,
            Daemon::Ospf6d => 2606,
            Daemon::Ospfapi => 2607,
            Daemon::Isisd => 2608,
            Daemon::Staticd => 2616,
        }
    }

    fn known_names() -> String {
        Daemon::ALL
            .iter()
            .map(Daemon::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Daemon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Daemon {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "zebra-services" {
            return Ok(Daemon::ZebraServices);
        }
        Daemon::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| LabError::UnknownDaemon {
                name: s.to_string(),
                known: Daemon::known_names(),
            })
    }
}
