//! Command executor

use serde::{Deserialize, Serialize};

use crate::cli::SubCommand;
use crate::context::Context;
use crate::engine::actions::*;
use crate::engine::queries::query_status;
use crate::error::Result;

/// Result of command execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub data: ResultData,
    pub message: Option<String>,
}

impl ExecutionResult {
    pub fn new(data: ResultData) -> Self {
        Self { data, message: None }
    }

    pub fn with_message(data: ResultData, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ResultData {
    /// Build, pull, image removal, destroy and create
    ActionResult(ActionResult),
    /// Started containers, or the content of the state store
    Containers(Vec<ContainerInfo>),
    /// Commands run inside containers
    Output(Vec<CommandOutput>),
    /// Containers committed into images
    Frozen(Vec<FrozenImage>),
    Message(String),
    Empty,
}

/// A container known to the state store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub name: String,
    pub id: String,
    pub address: String,
}

/// Commands run in one container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub container: String,
    pub command: String,
    /// Captured output; `None` when the command ran over the remote shell
    pub output: Option<String>,
    pub frozen: Option<FrozenImage>,
}

/// A container committed into an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenImage {
    pub container: String,
    pub image: String,
    pub image_id: String,
}

/// Execute one sub-command against a loaded context
pub fn execute_command(cmd: &SubCommand, ctx: &Context) -> Result<ExecutionResult> {
    match cmd {
        SubCommand::Create => create_project(ctx.work_dir()),
        SubCommand::Build { all, names } => build_images(ctx, *all, names),
        SubCommand::Start { all, force, names } => start_containers(ctx, *all, *force, names),
        SubCommand::Run {
            save,
            update,
            force,
            targets,
        } => run_commands(
            ctx,
            targets,
            &RunOptions {
                save: save.clone(),
                update: *update,
                force: *force,
            },
        ),
        SubCommand::Runall {
            commands,
            own,
            containers,
            update,
            force,
        } => run_all(
            ctx,
            &RunallOptions {
                labels: commands.clone(),
                own_command: own.clone(),
                containers: containers.clone(),
                update: *update,
                force: *force,
            },
        ),
        SubCommand::Enter { force, names } => enter_container(ctx, names, *force),
        SubCommand::Freeze { all, targets } => freeze_containers(ctx, *all, targets),
        SubCommand::Destroy { names } => destroy_containers(ctx, names),
        SubCommand::Pull { all, images } => pull_images(ctx, *all, images),
        SubCommand::Rmi { all, images } => remove_images(ctx, *all, images),
        SubCommand::Status => {
            let containers = query_status(&ctx.store)?;
            let message = if containers.is_empty() {
                Some("No containers recorded in the state file".to_string())
            } else {
                None
            };
            Ok(ExecutionResult {
                data: ResultData::Containers(containers),
                message,
            })
        }
    }
}
