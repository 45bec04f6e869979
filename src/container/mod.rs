//! Container model and runtime invocation synthesis
//!
//! - `spec`: the declarative `ContainerSpec` read from the Cranefile
//! - `invocation`: pure builders for the runtime's argument vectors

pub mod invocation;
pub mod spec;

pub use invocation::{run_arguments, RunFlags};
pub use spec::ContainerSpec;
