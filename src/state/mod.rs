//! Durable runtime state
//!
//! Tracks, across invocations, which containers Crane started and how to
//! reach them. The store is the only source of truth for "is this container
//! running": nothing is reconciled against the live runtime.

mod store;

pub use store::{StateStore, STATE_FILE};

use serde::{Deserialize, Serialize};

/// Address recorded for containers that are not daemonized
pub const NOT_DAEMONIZED_ADDRESS: &str = "not_deamonized_has_no_ip";

/// Last known runtime facts of a named container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeRecord {
    /// Runtime-assigned container id
    #[serde(rename = "ID", default)]
    pub id: String,
    /// Reachable address, or `NOT_DAEMONIZED_ADDRESS`
    #[serde(rename = "IP", default)]
    pub address: String,
}

impl RuntimeRecord {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
        }
    }

    /// Record of a foreground container, which has no stable address
    pub fn foreground(id: impl Into<String>) -> Self {
        Self::new(id, NOT_DAEMONIZED_ADDRESS)
    }
}
