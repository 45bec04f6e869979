//! Query implementations

pub mod runtime;
pub mod status;

pub use runtime::{CliQuery, RuntimeQuery};
pub use status::query_status;
