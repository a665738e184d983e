use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::rc::Rc;

use mnlab::config_loader;
use mnlab::error::LabError;
use mnlab::console::CommandLoop;
use mnlab::emulator::MininetEmulator;
use mnlab::orchestrator::Orchestrator;
use mnlab::process::ProcFs;
use mnlab::scenario::ScenarioKind;
use mnlab::topology::TopologyKind;
use mnlab::utils::{Interrupt, SystemRunner};

/// Launch a network scenario in Mininet
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The topology of the network
    #[arg(long, value_enum)]
    topology: TopologyKind,

    /// The scenario to set up in the network
    #[arg(long, value_enum)]
    scenario: ScenarioKind,

    /// Optional YAML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Reject the combination before touching anything on the host
    args.topology.ensure_supported(args.scenario)?;

    let config = config_loader::load_or_default(args.config.as_deref())
        .wrap_err("Failed to load configuration")?;

    let runner = Rc::new(SystemRunner::new(config.command_timeout));
    let table = Rc::new(ProcFs::new(&config.proc_root));
    let emulator = MininetEmulator::new(
        &config.mnexec,
        &config.mn,
        runner.clone(),
        table,
        config.node_start_timeout,
    );

    // Ctrl-C must not kill the process: teardown has to run first.
    let interrupt = Interrupt::register().wrap_err("Failed to install signal handlers")?;

    let mut console = CommandLoop::new(BufReader::new(io::stdin()), io::stdout())
        .with_interrupt(interrupt.clone());

    let result = Orchestrator::new(&config, &emulator, runner.as_ref())
        .with_interrupt(interrupt)
        .run(args.topology, args.scenario, &mut console);
    let summary = match result {
        Err(LabError::Interrupted) => {
            info!("Interrupted, network torn down");
            return Ok(());
        }
        other => other
            .wrap_err_with(|| format!("Scenario {} on {} failed", args.scenario, args.topology))?,
    };

    if !summary.failed.is_empty() {
        info!(
            "Daemons that failed to start: {}",
            summary
                .failed
                .iter()
                .map(|(node, daemon)| format!("{}/{}", node, daemon))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}
