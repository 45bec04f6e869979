//! Crane - declarative orchestration of a small fleet of Docker containers
//!
//! Containers are declared in a `Cranefile.toml`. Crane turns each
//! declaration into runtime invocations (build, run, commit, kill, ...) and
//! remembers in a small state file which containers it started and how to
//! reach them.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use crane::cli::SubCommand;
//! use crane::process::{ElevatedExecutor, SshShell};
//! use crane::{execute_command, format_output, Context, OutputFormat};
//!
//! let executor = ElevatedExecutor::new("sudo", "docker", ".");
//! let shell = SshShell;
//! let ctx = Context::load(Path::new("."), &executor, &shell).unwrap();
//! let result = execute_command(&SubCommand::Status, &ctx).unwrap();
//! println!("{}", format_output(&result, OutputFormat::Human));
//! ```

pub mod cli;
pub mod config;
pub mod container;
pub mod context;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod process;
pub mod queue;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use container::ContainerSpec;
pub use context::Context;
pub use engine::{execute_command, ExecutionResult, ResultData};
pub use error::{CraneError, Result};
pub use output::{format_output, OutputFormat};
pub use state::{RuntimeRecord, StateStore};
