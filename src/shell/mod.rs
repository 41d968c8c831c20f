//! Shell command execution for step runners.

pub mod command;

pub use command::{execute, CommandOptions, CommandResult};
