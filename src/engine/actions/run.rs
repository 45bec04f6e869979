//! Running commands inside containers
//!
//! Each argument has the form `<container>:<commands>`, where `<commands>` is
//! either a comma-separated list of labels from the container's command table
//! or `#` followed by a raw shell command.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::ensure_image;
use super::freeze::freeze_container;
use crate::container::invocation::{with_shell_command, SHELL, SHELL_STRING_OPTION};
use crate::container::{run_arguments, ContainerSpec, RunFlags};
use crate::context::Context;
use crate::engine::executor::{CommandOutput, ExecutionResult, ResultData};
use crate::error::{CraneError, Result};
use crate::queue::NameQueue;
use crate::state::RuntimeRecord;

/// Separates the container name from its commands
pub const COMMANDS_DELIMITER: char = ':';
/// Marks a raw shell command instead of command labels
pub const OWN_COMMANDS_PREFIX: char = '#';
/// Joins several shell commands into one
pub const INTERNAL_DELIMITER: &str = ";";

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Comma-separated image names, handed to containers in argument order
    pub save: Option<String>,
    /// Freeze every container over its configured image afterwards
    pub update: bool,
    pub force: bool,
}

pub fn run_commands(ctx: &Context, targets: &[String], options: &RunOptions) -> Result<ExecutionResult> {
    if targets.is_empty() {
        return Err(CraneError::InvalidArguments(
            "Missing arguments. Specify containers and their commands, or did you mean runall?"
                .to_string(),
        ));
    }

    let mut images = options.save.as_deref().map(NameQueue::from_list).unwrap_or_default();
    if !images.is_empty() {
        debug!(images = %images, "containers will be saved as new images");
    }

    let mut outputs = Vec::new();
    for target in targets {
        let (container_name, requested) = split_target(target)?;
        let spec = ctx.config.container(container_name)?;
        let command = resolve_commands(spec, container_name, requested)?;

        let output = run_in_container(ctx, container_name, spec, &command, options.force)?;

        let frozen = if options.update {
            Some(freeze_container(ctx, container_name, None)?)
        } else if let Some(image) = images.pop() {
            Some(freeze_container(ctx, container_name, Some(&image))?)
        } else {
            None
        };

        outputs.push(CommandOutput {
            container: container_name.to_string(),
            command,
            output,
            frozen,
        });
    }
    Ok(ExecutionResult::new(ResultData::Output(outputs)))
}

/// Run `command` in a container and update its record.
///
/// Daemonized containers get the command over the remote shell and must have
/// been started. Others are run fresh; their captured output is returned and
/// their id is stored with the foreground address.
pub fn run_in_container(
    ctx: &Context,
    container_name: &str,
    spec: &ContainerSpec,
    command: &str,
    force: bool,
) -> Result<Option<String>> {
    if spec.daemonized {
        let record = ctx.store.require(container_name)?;
        let remote_command = format!("{} {} \"{}\"", SHELL, SHELL_STRING_OPTION, command);
        info!(container = %container_name, address = %record.address, "running command over remote shell");
        ctx.shell
            .run(&record.address, &spec.username, &spec.password, &remote_command)?;
        return Ok(None);
    }

    let flags = RunFlags {
        identifier_file: true,
        ..RunFlags::default()
    };
    let args = with_shell_command(run_arguments(spec, container_name, flags)?, command);
    ensure_image(ctx, container_name, spec, force)?;

    info!(container = %container_name, "running command in a new container");
    let output = ctx.executor.captured(&args)?;

    let id = ctx.take_container_id(container_name)?;
    let mut records = BTreeMap::new();
    records.insert(container_name.to_string(), RuntimeRecord::foreground(id));
    ctx.store.upsert(&records)?;

    Ok(Some(String::from_utf8_lossy(&output).into_owned()))
}

/// Shell command for the labels (or raw command) given on the command line
pub fn resolve_commands(spec: &ContainerSpec, container_name: &str, requested: &str) -> Result<String> {
    if requested.starts_with(OWN_COMMANDS_PREFIX) {
        debug!(container = %container_name, "own command given");
        return Ok(requested.trim_start_matches(OWN_COMMANDS_PREFIX).to_string());
    }

    if spec.commands.is_empty() {
        return Err(CraneError::Config(format!(
            "Container '{}' has no commands defined in the Cranefile",
            container_name
        )));
    }

    let mut commands = Vec::new();
    for label in requested.split(',').map(str::trim).filter(|label| !label.is_empty()) {
        let command = spec.command(label)?.ok_or_else(|| {
            CraneError::Config(format!(
                "Command '{}' is not defined for container '{}'",
                label, container_name
            ))
        })?;
        commands.push(command);
    }
    if commands.is_empty() {
        return Err(CraneError::InvalidArguments(format!(
            "No commands given for container '{}'",
            container_name
        )));
    }

    let command = commands.join(INTERNAL_DELIMITER);
    debug!(container = %container_name, command = %command, "resolved command labels");
    Ok(command)
}

fn split_target(target: &str) -> Result<(&str, &str)> {
    match target.split_once(COMMANDS_DELIMITER) {
        Some((name, commands)) if !name.is_empty() && !commands.is_empty() => Ok((name, commands)),
        _ => Err(CraneError::InvalidArguments(format!(
            "Wrong argument format '{}', expected <container>:<commands>",
            target
        ))),
    }
}
