#[cfg(test)]
mod scenario_run_tests {
    use std::cell::RefCell;
    use std::ffi::OsStr;
    use std::fs;
    use std::io::Cursor;
    use std::rc::Rc;

    use tempfile::tempdir;

    use mnlab::config::Config;
    use mnlab::console::CommandLoop;
    use mnlab::emulator::{Emulator, Network, Node};
    use mnlab::error::{LabError, LabResult};
    use mnlab::orchestrator::Orchestrator;
    use mnlab::process::Daemon;
    use mnlab::scenario::ScenarioKind;
    use mnlab::topology::{LinkSpec, TopologyDescriptor, TopologyKind};
    use mnlab::utils::{CommandError, CommandOutput, CommandRunner};

    type Journal = Rc<RefCell<Vec<String>>>;

    /// Network that records every command instead of running it
    struct RecordingNetwork {
        nodes: Vec<Node>,
        links: Vec<LinkSpec>,
        journal: Journal,
    }

    impl Network for RecordingNetwork {
        fn nodes(&self) -> &[Node] {
            &self.nodes
        }

        fn links(&self) -> &[LinkSpec] {
            &self.links
        }

        fn cmd(&mut self, node: &str, command: &str) -> LabResult<CommandOutput> {
            self.journal.borrow_mut().push(format!("{}: {}", node, command));
            Ok(CommandOutput::default())
        }

        fn stop(&mut self) -> LabResult<()> {
            self.journal.borrow_mut().push("net.stop".to_string());
            Ok(())
        }
    }

    struct RecordingEmulator {
        journal: Journal,
        fail_start: bool,
    }

    impl Emulator for RecordingEmulator {
        fn cleanup(&self) -> LabResult<()> {
            self.journal.borrow_mut().push("emulator.cleanup".to_string());
            // a failing cleanup step must not abort the run
            Err(LabError::Emulator("mn not installed".to_string()))
        }

        fn start(&self, topology: &TopologyDescriptor) -> LabResult<Box<dyn Network>> {
            self.journal
                .borrow_mut()
                .push(format!("emulator.start {}", topology.name));
            if self.fail_start {
                return Err(LabError::Emulator("cannot create namespace".to_string()));
            }
            let nodes = topology
                .nodes
                .iter()
                .enumerate()
                .map(|(i, spec)| Node {
                    name: spec.name.clone(),
                    role: spec.role,
                    pid: 500 + i as u32,
                    loopback: spec.loopback.clone(),
                })
                .collect();
            Ok(Box::new(RecordingNetwork {
                nodes,
                links: topology.links.clone(),
                journal: self.journal.clone(),
            }))
        }
    }

    struct RecordingRunner {
        journal: Journal,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, program: &OsStr, args: &[String]) -> Result<CommandOutput, CommandError> {
            self.journal
                .borrow_mut()
                .push(format!("{} {}", program.to_string_lossy(), args.join(" ")));
            Ok(CommandOutput {
                code: 1,
                stdout: String::new(),
                stderr: "zebra: no process found".to_string(),
            })
        }
    }

    fn setup(fail_start: bool) -> (Journal, RecordingEmulator, RecordingRunner) {
        let journal: Journal = Rc::new(RefCell::new(Vec::new()));
        let emulator = RecordingEmulator {
            journal: journal.clone(),
            fail_start,
        };
        let runner = RecordingRunner {
            journal: journal.clone(),
        };
        (journal, emulator, runner)
    }

    /// Two routers, basic scenario: no daemons, routers post-configured,
    /// teardown kills the daemon list anyway.
    #[test]
    fn test_two_nodes_basic_end_to_end() {
        let runtime = tempdir().unwrap();
        for stale in ["R1-zebra.pid", "R2-isisd.out", "R1.log", "h1_1.log", "hosts"] {
            fs::write(runtime.path().join(stale), "stale").unwrap();
        }
        let config = Config {
            runtime_dir: runtime.path().to_path_buf(),
            ..Config::default()
        };
        let (journal, emulator, runner) = setup(false);
        let mut console = CommandLoop::new(Cursor::new("nodes\nexit\n"), Vec::new());

        let summary = Orchestrator::new(&config, &emulator, &runner)
            .run(TopologyKind::TwoNodes, ScenarioKind::Basic, &mut console)
            .unwrap();

        // cleanup
        assert_eq!(summary.removed_artifacts.len(), 4);
        assert!(runtime.path().join("hosts").exists());
        assert!(!runtime.path().join("R1-zebra.pid").exists());
        assert_eq!(summary.cleanup_failures.len(), 1);

        // no daemons for this scenario
        assert!(summary.launched.is_empty());
        assert!(summary.failed.is_empty());

        let journal = journal.borrow();
        let expected = vec![
            "emulator.cleanup",
            "killall -9 zebra staticd isisd",
            "emulator.start two_nodes",
            "R1: ip addr add 10.0.0.1/30 dev R1-eth0",
            "R2: ip addr add 10.0.0.2/30 dev R2-eth0",
            "R1: ip addr add 1.1.1.1/32 dev lo",
            "R2: ip addr add 2.2.2.2/32 dev lo",
            "R1: sysctl -w net.ipv4.ip_forward=1",
            "R1: ip addr del 127.0.0.1/8 dev lo",
            "R2: sysctl -w net.ipv4.ip_forward=1",
            "R2: ip addr del 127.0.0.1/8 dev lo",
            "net.stop",
            "killall -9 zebra staticd isisd",
        ];
        assert_eq!(*journal, expected);

        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains("R1 R2"));
        println!("✓ two_nodes/basic ran end to end");
    }

    #[test]
    fn test_isis_on_one_node_is_rejected_up_front() {
        let runtime = tempdir().unwrap();
        fs::write(runtime.path().join("R1-zebra.pid"), "1").unwrap();
        let config = Config {
            runtime_dir: runtime.path().to_path_buf(),
            ..Config::default()
        };
        let (journal, emulator, runner) = setup(false);
        let mut console = CommandLoop::new(Cursor::new(""), Vec::new());

        let err = Orchestrator::new(&config, &emulator, &runner)
            .run(TopologyKind::OneNode, ScenarioKind::Isis, &mut console)
            .unwrap_err();

        assert!(matches!(err, LabError::UnsupportedScenario { .. }));
        assert!(journal.borrow().is_empty(), "nothing may run before validation");
        assert!(runtime.path().join("R1-zebra.pid").exists());
    }

    #[test]
    fn test_failed_instantiation_still_kills_daemons() {
        let runtime = tempdir().unwrap();
        let config = Config {
            runtime_dir: runtime.path().to_path_buf(),
            ..Config::default()
        };
        let (journal, emulator, runner) = setup(true);
        let mut console = CommandLoop::new(Cursor::new(""), Vec::new());

        let err = Orchestrator::new(&config, &emulator, &runner)
            .run(TopologyKind::OneNode, ScenarioKind::Plain, &mut console)
            .unwrap_err();
        assert!(matches!(err, LabError::Emulator(_)));

        let journal = journal.borrow();
        assert_eq!(journal.last().map(String::as_str), Some("killall -9 zebra staticd isisd"));
        assert!(!journal.iter().any(|l| l == "net.stop"));
    }

    #[test]
    fn test_isis_daemon_order_per_node() {
        let root = tempdir().unwrap();
        let topology_root = root.path().join("topology");
        for daemon in ["zebra", "staticd", "isisd"] {
            let dir = topology_root.join("two_nodes").join("isis").join(daemon);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("R1.conf"), "!\n").unwrap();
            fs::write(dir.join("R2.conf"), "!\n").unwrap();
        }
        let config = Config {
            runtime_dir: root.path().to_path_buf(),
            topology_root: topology_root.clone(),
            ..Config::default()
        };
        let (journal, emulator, runner) = setup(false);
        let mut console = CommandLoop::new(Cursor::new("exit\n"), Vec::new());

        let summary = Orchestrator::new(&config, &emulator, &runner)
            .run(TopologyKind::TwoNodes, ScenarioKind::Isis, &mut console)
            .unwrap();

        assert_eq!(
            summary.launched,
            vec![
                ("R1".to_string(), Daemon::Zebra),
                ("R1".to_string(), Daemon::Staticd),
                ("R1".to_string(), Daemon::Isisd),
                ("R2".to_string(), Daemon::Zebra),
                ("R2".to_string(), Daemon::Staticd),
                ("R2".to_string(), Daemon::Isisd),
            ]
        );

        let journal = journal.borrow();
        let launches: Vec<&String> = journal.iter().filter(|l| l.contains("/usr/lib/frr/")).collect();
        assert_eq!(launches.len(), 6);
        let isis_conf = topology_root.join("two_nodes/isis/isisd/R2.conf");
        assert!(launches[5].starts_with("R2: /usr/lib/frr/isisd -f "));
        assert!(launches[5].contains(&isis_conf.display().to_string()));
        assert!(launches[5].contains(&format!("-i {}/R2-isisd.pid", root.path().display())));
    }
}
