//! Execution engine for Crane sub-commands

pub mod actions;
pub mod executor;
pub mod queries;

pub use executor::{execute_command, ExecutionResult, ResultData};
