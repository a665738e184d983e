//! Shared utilities: external command execution, best-effort cleanup and
//! operator interrupts.

pub mod cleanup;
pub mod command;
pub mod interrupt;

pub use cleanup::{remove_artifacts, CleanupReport};
pub use command::{CommandError, CommandOutput, CommandRunner, SystemRunner};
pub use interrupt::Interrupt;
