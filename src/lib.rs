//! # mnlab - FRR scenarios on Mininet
//!
//! This library drives a Mininet-style network emulator and FRRouting
//! daemons to bring up small predefined test networks for interactive
//! exploration.
//!
//! ## Overview
//!
//! Two entry points share this crate:
//!
//! - **Scenario runner** (`mnlab`): cleans up what an earlier run left
//!   behind, builds a topology, applies a scenario, starts the routing
//!   daemons node by node and drops into an interactive console. Leaving the
//!   console tears everything down.
//! - **Attach tool** (`mnlab-attach`): finds the shell of a running node in
//!   the process table and opens a shell, a command or a daemon's vty inside
//!   that node.
//!
//! ## Architecture
//!
//! - `process`: node process discovery, interactive attach, daemon launching
//! - `emulator`: seams to the emulator plus the Mininet driver
//! - `topology`: the predefined topologies
//! - `scenario`: the predefined scenarios and their daemon placement
//! - `orchestrator`: the run sequence with guaranteed teardown
//! - `console`: the interactive command loop
//! - `config` / `config_loader`: optional YAML settings
//! - `utils`: command execution with timeouts, best-effort cleanup and
//!   operator interrupts
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mnlab::process::{locate, AttachTarget, ProcFs, SessionAttacher};
//!
//! let table = ProcFs::default();
//! let record = locate(&table, "R1")?;
//! let attacher = SessionAttacher::new("mnexec", &table);
//! let code = attacher.attach(record.pid, &AttachTarget::Daemon("isisd".into()))?;
//! std::process::exit(code);
//! # Ok::<(), mnlab::error::LabError>(())
//! ```
//!
//! ## Files
//!
//! ```text
//! <runtime_dir>/<node>-<daemon>.pid    # daemon pid file
//! <runtime_dir>/<node>-<daemon>.out    # daemon stdout and stderr
//! <topology_root>/<topology>/<scenario>/<daemon>/<node>.conf
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`error::LabError`]; the binaries wrap it with
//! `color_eyre` for reporting.

pub mod config;
pub mod config_loader;
pub mod console;
pub mod emulator;
pub mod error;
pub mod orchestrator;
pub mod process;
pub mod scenario;
pub mod topology;
pub mod utils;
