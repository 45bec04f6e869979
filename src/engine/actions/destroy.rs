//! Killing and removing started containers

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::ActionResult;
use crate::container::invocation::{verb_arguments, KILL, REMOVE};
use crate::context::Context;
use crate::engine::executor::{ExecutionResult, ResultData};
use crate::error::{CraneError, Result};

/// Kill and remove every stored container, or only the named ones, then
/// forget their records.
///
/// Only containers Crane itself started (those in the state store) can be
/// destroyed.
pub fn destroy_containers(ctx: &Context, names: &[String]) -> Result<ExecutionResult> {
    let records = ctx.store.records()?;
    if records.is_empty() {
        return Err(CraneError::State(
            "There are no containers in the state file, nothing to destroy".to_string(),
        ));
    }

    let chosen: Vec<(String, String)> = records
        .into_iter()
        .filter(|(name, _)| names.is_empty() || names.contains(name))
        .map(|(name, record)| (name, record.id))
        .collect();
    if chosen.is_empty() {
        return Err(CraneError::State(
            "No such containers were found in the state file. Only containers started by crane can be destroyed"
                .to_string(),
        ));
    }

    let ids: Vec<&str> = chosen.iter().map(|(_, id)| id.as_str()).collect();
    debug!(containers = ?chosen, "destroying containers");

    let killed = ctx.executor.captured(&verb_arguments(KILL, &ids))?;
    info!(output = %String::from_utf8_lossy(&killed).trim(), "killed containers");
    let removed = ctx.executor.captured(&verb_arguments(REMOVE, &ids))?;
    info!(output = %String::from_utf8_lossy(&removed).trim(), "removed containers");

    let destroyed: BTreeSet<String> = chosen.into_iter().map(|(name, _)| name).collect();
    ctx.store.remove(&destroyed)?;

    Ok(ExecutionResult::new(ResultData::ActionResult(ActionResult::new(
        "destroy",
        destroyed.into_iter().collect(),
    ))))
}
