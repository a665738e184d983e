//! Operator interrupts.
//!
//! SIGINT, SIGTERM and SIGQUIT only raise a flag. The run checks it between
//! steps and leaves through its normal error path, so teardown still runs.

use crate::error::{LabError, LabResult};
use signal_hook::consts::{SIGINT, SIGQUIT, SIGTERM};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "the operator wants out" flag
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// A flag that nothing but [`Interrupt::raise`] sets
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag raised by SIGINT, SIGTERM and SIGQUIT.
    ///
    /// Registering replaces the default action of these signals: the process
    /// no longer dies on Ctrl-C.
    pub fn register() -> io::Result<Self> {
        let interrupt = Self::new();
        for signal in [SIGINT, SIGTERM, SIGQUIT] {
            signal_hook::flag::register(signal, Arc::clone(&interrupt.0))?;
        }
        Ok(interrupt)
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Lower the flag, returning whether it was raised
    pub fn clear(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    /// `Err(Interrupted)` once the flag is up
    pub fn check(&self) -> LabResult<()> {
        if self.is_raised() {
            Err(LabError::Interrupted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let interrupt = Interrupt::new();
        let handle = interrupt.clone();
        assert!(interrupt.check().is_ok());

        handle.raise();
        assert!(interrupt.is_raised());
        assert!(matches!(interrupt.check(), Err(LabError::Interrupted)));

        assert!(interrupt.clear());
        assert!(!handle.is_raised());
        assert!(!interrupt.clear());
    }
}
