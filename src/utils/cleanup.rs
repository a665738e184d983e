//! Best-effort cleanup helpers.
//!
//! Cleanup never aborts a run: each step is attempted independently, failures
//! are collected into a [`CleanupReport`] and logged.

use log::{debug, warn};
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffixes of the per-node artifacts left behind by a previous run
pub const ARTIFACT_SUFFIXES: [&str; 3] = [".log", ".pid", ".out"];

/// Failures collected while running independent cleanup steps
#[derive(Debug, Default)]
pub struct CleanupReport {
    failures: Vec<String>,
}

impl CleanupReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one step. Errors are kept, successes are dropped.
    pub fn attempt<T, E: Display>(&mut self, step: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.failures.push(format!("{}: {}", step, e));
                None
            }
        }
    }

    pub fn merge(&mut self, other: CleanupReport) {
        self.failures.extend(other.failures);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Emit one warning per failed step
    pub fn log(&self, phase: &str) {
        for failure in &self.failures {
            warn!("{} (ignored): {}", phase, failure);
        }
    }
}

/// Remove `<dir>/<prefix>*{.log,.pid,.out}` for every prefix.
///
/// Returns the removed paths; failures to remove individual files are
/// recorded in `report` and do not stop the scan.
pub fn remove_artifacts(dir: &Path, prefixes: &[&str], report: &mut CleanupReport) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            report.attempt::<(), _>(&format!("scan {}", dir.display()), Err(e));
            return Vec::new();
        }
    };

    let mut removed = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_artifact(name, prefixes) {
            continue;
        }
        let path = entry.path();
        if report
            .attempt(&format!("remove {}", path.display()), remove_file(&path))
            .is_some()
        {
            debug!("Removed stale artifact {:?}", path);
            removed.push(path);
        }
    }
    removed.sort();
    removed
}

fn remove_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        // Another process may have removed it in between.
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn is_artifact(file_name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| file_name.starts_with(p))
        && ARTIFACT_SUFFIXES.iter().any(|s| file_name.ends_with(s))
}
