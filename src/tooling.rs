//! Tooling & Integration Layer
//!
//! Command-line surface over the agent services.

pub mod cli;

pub use cli::{Cli, CliContext, CommandOutput, Commands};
