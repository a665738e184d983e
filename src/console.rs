//! Interactive command loop over a running network.
//!
//! ```text
//! mininet> nodes
//! R1 R2
//! mininet> R1 ip route
//! ...
//! mininet> exit
//! ```

use crate::emulator::Network;
use crate::error::LabResult;
use crate::utils::interrupt::Interrupt;
use log::{debug, info};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

pub const PROMPT: &str = "mininet> ";

/// How often a waiting prompt looks at the interrupt flag
const INTERRUPT_POLL: Duration = Duration::from_millis(100);

const HELP: &str = "\
Commands:
  help                 show this message
  nodes                list nodes
  links                list links
  <node> <command...>  run a shell command inside a node
  exit | quit          leave (EOF works too)
";

/// Hands control to the operator until they leave.
pub trait Console {
    fn interact(&mut self, net: &mut dyn Network) -> LabResult<()>;
}

/// Line-oriented console reading commands from `input`.
///
/// Input is read on its own thread so that an interrupt at the prompt is
/// noticed without waiting for the next line.
pub struct CommandLoop<W> {
    lines: Receiver<io::Result<String>>,
    output: W,
    interrupt: Interrupt,
}

impl<W: Write> CommandLoop<W> {
    pub fn new<R: BufRead + Send + 'static>(input: R, output: W) -> Self {
        Self {
            lines: spawn_reader(input),
            output,
            interrupt: Interrupt::new(),
        }
    }

    /// Leave the loop when `interrupt` is raised while the prompt waits
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Handle one line. Returns `false` once the operator asked to leave.
    fn handle(&mut self, net: &mut dyn Network, line: &str) -> LabResult<bool> {
        let line = line.trim();
        let (first, rest) = match line.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest.trim()),
            None => (line, ""),
        };

        match first {
            "" => {}
            "exit" | "quit" => return Ok(false),
            "help" => self.output.write_all(HELP.as_bytes())?,
            "nodes" => {
                let names: Vec<&str> = net.nodes().iter().map(|n| n.name.as_str()).collect();
                writeln!(self.output, "{}", names.join(" "))?;
            }
            "links" => {
                for link in net.links() {
                    writeln!(self.output, "{}", link)?;
                }
            }
            node if net.node(node).is_some() => {
                if rest.is_empty() {
                    writeln!(self.output, "*** Enter a command for node: {} <cmd>", node)?;
                } else {
                    debug!("{}: {}", node, rest);
                    let result = net.cmd(node, rest);
                    // Ctrl-C during a node command stops that command only;
                    // the terminal delivered it to the command as well.
                    if self.interrupt.clear() {
                        writeln!(self.output, "Interrupt")?;
                    }
                    match result {
                        Ok(out) => {
                            self.output.write_all(out.stdout.as_bytes())?;
                            self.output.write_all(out.stderr.as_bytes())?;
                        }
                        Err(e) => writeln!(self.output, "*** {}", e)?,
                    }
                }
            }
            unknown => writeln!(self.output, "*** Unknown command: {}", unknown)?,
        }
        Ok(true)
    }
}

impl<W: Write> Console for CommandLoop<W> {
    fn interact(&mut self, net: &mut dyn Network) -> LabResult<()> {
        loop {
            write!(self.output, "{}", PROMPT)?;
            self.output.flush()?;

            let line = loop {
                if self.interrupt.is_raised() {
                    writeln!(self.output)?;
                    info!("Interrupted at the prompt");
                    return Ok(());
                }
                match self.lines.recv_timeout(INTERRUPT_POLL) {
                    Ok(line) => break Some(line?),
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break None,
                }
            };

            let Some(line) = line else {
                // EOF
                writeln!(self.output)?;
                return Ok(());
            };
            if !self.handle(net, &line)? {
                return Ok(());
            }
        }
    }
}

/// Forward lines from `input` until EOF or the first read error
fn spawn_reader<R: BufRead + Send + 'static>(input: R) -> Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in input.lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::fake::FakeNetwork;
    use crate::topology::TopologyKind;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::path::Path;
    use std::rc::Rc;

    fn run(script: &str) -> (String, Vec<String>) {
        run_with(script, Interrupt::new())
    }

    fn run_with(script: &str, interrupt: Interrupt) -> (String, Vec<String>) {
        let topo = TopologyKind::TwoNodes.build(Path::new("topology"));
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut net = FakeNetwork::new(&topo, journal.clone());

        let mut console =
            CommandLoop::new(Cursor::new(script.to_string()), Vec::new()).with_interrupt(interrupt);
        console.interact(&mut net).unwrap();
        let output = String::from_utf8(console.into_output()).unwrap();
        let journal = journal.borrow().clone();
        (output, journal)
    }

    #[test]
    fn test_exit_immediately() {
        let (output, journal) = run("exit\nR1 should-not-run\n");
        assert_eq!(output, PROMPT);
        assert!(journal.is_empty());
    }

    #[test]
    fn test_eof_leaves_loop() {
        let (output, _) = run("");
        assert_eq!(output, format!("{}\n", PROMPT));
    }

    #[test]
    fn test_nodes_and_links() {
        let (output, _) = run("nodes\nlinks\nquit\n");
        assert!(output.contains("R1 R2\n"));
        assert!(output.contains("R1:R1-eth0 <-> R2:R2-eth0\n"));
    }

    #[test]
    fn test_node_command() {
        let (output, journal) = run("R2   ip route show\nexit\n");
        assert_eq!(journal, vec!["R2: ip route show"]);
        assert!(output.contains("ran ip route show\n"));
    }

    #[test]
    fn test_unknown_command_keeps_looping() {
        let (output, journal) = run("R3 ls\nR1\nR1 true\n");
        assert!(output.contains("*** Unknown command: R3"));
        assert!(output.contains("*** Enter a command for node: R1 <cmd>"));
        assert_eq!(journal, vec!["R1: true"]);
    }

    #[test]
    fn test_interrupt_at_prompt_leaves_loop() {
        let interrupt = Interrupt::new();
        interrupt.raise();
        let (output, journal) = run_with("R1 true\nnodes\n", interrupt);
        assert_eq!(output, format!("{}\n", PROMPT));
        assert!(journal.is_empty());
    }

    #[test]
    fn test_interrupt_during_node_command_keeps_session() {
        /// Network whose commands behave like one stopped with Ctrl-C
        struct InterruptedNetwork {
            inner: FakeNetwork,
            interrupt: Interrupt,
        }

        impl Network for InterruptedNetwork {
            fn nodes(&self) -> &[crate::emulator::Node] {
                self.inner.nodes()
            }

            fn links(&self) -> &[crate::topology::LinkSpec] {
                self.inner.links()
            }

            fn cmd(&mut self, node: &str, command: &str) -> LabResult<crate::utils::CommandOutput> {
                self.interrupt.raise();
                self.inner.cmd(node, command)
            }

            fn stop(&mut self) -> LabResult<()> {
                self.inner.stop()
            }
        }

        let topo = TopologyKind::TwoNodes.build(Path::new("topology"));
        let journal = Rc::new(RefCell::new(Vec::new()));
        let interrupt = Interrupt::new();
        let mut net = InterruptedNetwork {
            inner: FakeNetwork::new(&topo, journal.clone()),
            interrupt: interrupt.clone(),
        };

        let script = "R1 ping 10.0.0.2\nR2 true\nexit\n";
        let mut console =
            CommandLoop::new(Cursor::new(script), Vec::new()).with_interrupt(interrupt.clone());
        console.interact(&mut net).unwrap();

        assert_eq!(*journal.borrow(), vec!["R1: ping 10.0.0.2", "R2: true"]);
        let output = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(output.matches("Interrupt\n").count(), 2);
        assert!(!interrupt.is_raised());
    }
}
