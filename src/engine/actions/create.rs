//! Fresh project set-up

use std::path::Path;

use tracing::info;

use super::ActionResult;
use crate::config::{write_example, CONFIGURATION_FILE};
use crate::engine::executor::{ExecutionResult, ResultData};
use crate::error::Result;
use crate::state::{StateStore, STATE_FILE};

/// Write the example Cranefile and an empty state file into `work_dir`,
/// replacing existing ones
pub fn create_project(work_dir: &Path) -> Result<ExecutionResult> {
    let cranefile = work_dir.join(CONFIGURATION_FILE);
    write_example(&cranefile)?;
    StateStore::in_dir(work_dir).reset()?;

    info!(path = %cranefile.display(), "created example configuration");
    Ok(ExecutionResult::with_message(
        ResultData::ActionResult(ActionResult::new(
            "create",
            vec![CONFIGURATION_FILE.to_string(), STATE_FILE.to_string()],
        )),
        format!("Created an example {} in {}", CONFIGURATION_FILE, work_dir.display()),
    ))
}
