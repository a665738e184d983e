//! Connect to a node of a running Mininet network.
//!
//! Opens a shell (or the given command) inside the node, or with `--daemon`
//! a telnet session to that FRR daemon's vty port.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use env_logger::Env;

use mnlab::config_loader;
use mnlab::process::{locate, AttachTarget, ProcFs, SessionAttacher};

#[derive(Parser, Debug)]
#[command(name = "mnlab-attach")]
#[command(about = "Connect to a mininet node")]
#[command(version)]
struct Cli {
    /// The node's name (e.g., h1_1, R1, etc.)
    #[arg(short, long)]
    node: String,

    /// Connect directly to this FRR daemon
    #[arg(short, long)]
    daemon: Option<String>,

    /// Command to run on the node
    #[arg(
        short,
        long,
        num_args = 1..,
        allow_hyphen_values = true,
        default_value = "sh"
    )]
    cmd: Vec<String>,

    /// Optional YAML settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn target(&self) -> AttachTarget {
        match &self.daemon {
            Some(daemon) => AttachTarget::Daemon(daemon.clone()),
            None => AttachTarget::Command(self.cmd.clone()),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Keep the terminal quiet unless asked: this tool hands it to the session.
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = config_loader::load_or_default(cli.config.as_deref())
        .wrap_err("Failed to load configuration")?;

    let table = ProcFs::new(&config.proc_root);
    let record = locate(&table, &cli.node)?;

    let attacher = SessionAttacher::new(&config.mnexec, &table);
    let code = attacher
        .attach(record.pid, &cli.target())
        .wrap_err_with(|| format!("Cannot attach to {}", cli.node))?;

    std::process::exit(code);
}
