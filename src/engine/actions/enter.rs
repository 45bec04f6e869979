//! Interactive shells inside containers
//!
//! Daemonized containers are entered over the remote shell. Any other
//! container is run fresh with a TTY and `/bin/bash`, attached to the
//! terminal; its id is recorded once the session ends.

use std::collections::BTreeMap;

use tracing::info;

use super::ensure_image;
use crate::container::invocation::SHELL;
use crate::container::{run_arguments, RunFlags};
use crate::context::Context;
use crate::engine::executor::{ExecutionResult, ResultData};
use crate::error::{CraneError, Result};
use crate::state::RuntimeRecord;

pub fn enter_container(ctx: &Context, names: &[String], force: bool) -> Result<ExecutionResult> {
    let container_name = match names {
        [] => {
            return Err(CraneError::InvalidArguments(
                "No container name provided".to_string(),
            ))
        }
        [name] => name.as_str(),
        _ => {
            return Err(CraneError::InvalidArguments(
                "Too many arguments provided. You can enter only one container at a time".to_string(),
            ))
        }
    };
    let spec = ctx.config.container(container_name)?;

    if spec.daemonized {
        let record = ctx.store.require(container_name)?;
        info!(container = %container_name, address = %record.address, "entering container over remote shell");
        ctx.shell
            .run(&record.address, &spec.username, &spec.password, SHELL)?;
        return Ok(ExecutionResult::new(ResultData::Message(format!(
            "Left container '{}'",
            container_name
        ))));
    }

    let flags = RunFlags {
        interactive_tty: true,
        identifier_file: true,
    };
    let mut args = run_arguments(spec, container_name, flags)?;
    args.push(SHELL.to_string());
    ensure_image(ctx, container_name, spec, force)?;

    info!(container = %container_name, "entering new container");
    let session = ctx.executor.streaming(&args)?;
    let finished = session.wait();

    // The container exists even when the shell exited with an error. Without
    // an id file the runtime never created it, so its own failure is reported.
    let id = match ctx.take_container_id(container_name) {
        Ok(id) => id,
        Err(e) => {
            finished?;
            return Err(e);
        }
    };
    let mut records = BTreeMap::new();
    records.insert(container_name.to_string(), RuntimeRecord::foreground(id.clone()));
    ctx.store.upsert(&records)?;
    finished?;

    Ok(ExecutionResult::new(ResultData::Message(format!(
        "Left container '{}' ({})",
        container_name, id
    ))))
}
