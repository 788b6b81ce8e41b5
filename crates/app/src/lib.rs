//! WafGuard command-line application.
//!
//! Wires the parser, the reqwest executor, the suite runner and the
//! reporter together behind the `wafguard` binary.

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Command};
pub use logging::LogConfig;
