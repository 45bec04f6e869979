//! Running commands across every configured container

use tracing::{debug, warn};

use super::freeze::freeze_container;
use super::run::{run_in_container, INTERNAL_DELIMITER};
use crate::container::ContainerSpec;
use crate::context::Context;
use crate::engine::executor::{CommandOutput, ExecutionResult, ResultData};
use crate::error::{CraneError, Result};

#[derive(Debug, Clone, Default)]
pub struct RunallOptions {
    /// `;`-separated command labels to run in each container
    pub labels: Option<String>,
    /// Raw shell command to run in each container
    pub own_command: Option<String>,
    /// `;`-separated subset of containers
    pub containers: Option<String>,
    pub update: bool,
    pub force: bool,
}

/// Run commands in every configured container (or the chosen subset).
///
/// Without labels or an own command, each container runs its whole command
/// table.
pub fn run_all(ctx: &Context, options: &RunallOptions) -> Result<ExecutionResult> {
    check_exclusive(options)?;

    let names: Vec<String> = match non_empty(&options.containers) {
        Some(list) => {
            let names: Vec<String> = split_list(list).map(str::to_string).collect();
            for name in &names {
                ctx.config.container(name)?;
            }
            names
        }
        None => ctx.config.names(),
    };
    debug!(containers = ?names, "running commands in containers");

    let mut outputs = Vec::new();
    for name in &names {
        let spec = ctx.config.container(name)?;
        let command = container_command(spec, options)?;
        if command.is_empty() {
            warn!(container = %name, "no commands to run, skipping");
            continue;
        }

        let output = run_in_container(ctx, name, spec, &command, options.force)?;
        let frozen = if options.update {
            Some(freeze_container(ctx, name, None)?)
        } else {
            None
        };

        outputs.push(CommandOutput {
            container: name.clone(),
            command,
            output,
            frozen,
        });
    }
    Ok(ExecutionResult::new(ResultData::Output(outputs)))
}

/// Command line to run in one container.
///
/// Labels a container does not define are skipped, so one label list can be
/// used across containers with different command tables.
fn container_command(spec: &ContainerSpec, options: &RunallOptions) -> Result<String> {
    if let Some(own) = non_empty(&options.own_command) {
        return Ok(own.to_string());
    }

    let commands = match non_empty(&options.labels) {
        Some(labels) => {
            let mut commands = Vec::new();
            for label in split_list(labels) {
                match spec.command(label)? {
                    Some(command) => commands.push(command),
                    None => debug!(label, "label not defined for container"),
                }
            }
            commands
        }
        None => spec.all_commands()?,
    };
    Ok(commands.join(INTERNAL_DELIMITER))
}

fn check_exclusive(options: &RunallOptions) -> Result<()> {
    let given = [&options.labels, &options.own_command, &options.containers]
        .into_iter()
        .filter(|option| non_empty(option).is_some())
        .count();
    if given > 1 {
        return Err(CraneError::InvalidArguments(
            "Can't combine options with runall. Use only one of -c, -o and -l at a time".to_string(),
        ));
    }
    Ok(())
}

fn non_empty(option: &Option<String>) -> Option<&str> {
    option.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(INTERNAL_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RuntimeRecord;
    use crate::testing::{context, strings, FakeExecutor, FakeShell};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    const CRANEFILE: &str = r#"
[containers.tool]
IMAGE = "acme/tool"
COMMANDS = [["init", "echo init"], ["test", "make test"]]

[containers.builder]
IMAGE = "acme/builder"
COMMANDS = [["test", "cargo test"]]

[containers.web]
IMAGE = "acme/web"
DAEMONIZED = true
COMMANDS = [["init", "service nginx start"]]
"#;

    fn forced() -> RunallOptions {
        RunallOptions {
            force: true,
            ..RunallOptions::default()
        }
    }

    fn last_arguments(executor: &FakeExecutor) -> Vec<String> {
        executor
            .calls()
            .iter()
            .filter(|call| call[0] == "run")
            .filter_map(|call| call.last().cloned())
            .collect()
    }

    #[test]
    fn test_runall_every_command() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::writing_ids_to(temp_dir.path());
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);
        let mut records = BTreeMap::new();
        records.insert("web".to_string(), RuntimeRecord::new("w1", "172.17.0.4"));
        ctx.store.upsert(&records).unwrap();

        run_all(&ctx, &forced()).unwrap();

        assert_eq!(last_arguments(&executor), vec!["cargo test", "echo init;make test"]);
        assert_eq!(shell.calls()[0].command, "/bin/bash -c \"service nginx start\"");
        assert!(ctx.store.lookup("builder").unwrap().is_some());
    }

    #[test]
    fn test_runall_labels_skip_undefined() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::writing_ids_to(temp_dir.path());
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);
        let options = RunallOptions {
            labels: Some("test".to_string()),
            ..forced()
        };

        run_all(&ctx, &options).unwrap();

        assert_eq!(last_arguments(&executor), vec!["cargo test", "make test"]);
        assert!(shell.calls().is_empty());
    }

    #[test]
    fn test_runall_subset_in_given_order() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::writing_ids_to(temp_dir.path());
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);
        let options = RunallOptions {
            containers: Some("tool;builder".to_string()),
            ..forced()
        };

        run_all(&ctx, &options).unwrap();
        let run_images: Vec<String> = executor
            .calls()
            .iter()
            .filter(|call| call[0] == "run")
            .map(|call| call[4].clone())
            .collect();
        assert_eq!(run_images, vec!["acme/tool", "acme/builder"]);
    }

    #[test]
    fn test_runall_update_freezes() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::writing_ids_to(temp_dir.path());
        let shell = FakeShell::default();
        let ctx = context(
            temp_dir.path(),
            "[containers.tool]\nIMAGE = \"acme/tool\"\n",
            &executor,
            &shell,
        );
        let options = RunallOptions {
            own_command: Some("apt-get update".to_string()),
            update: true,
            ..forced()
        };

        run_all(&ctx, &options).unwrap();
        assert_eq!(executor.verbs(), vec!["run", "commit"]);
        assert_eq!(executor.calls()[1], strings(&["commit", "id-tool", "acme/tool"]));
    }

    #[test]
    fn test_runall_options_are_exclusive() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);
        let options = RunallOptions {
            labels: Some("init".to_string()),
            own_command: Some("ls".to_string()),
            ..forced()
        };

        assert!(matches!(run_all(&ctx, &options), Err(CraneError::InvalidArguments(_))));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn test_runall_bad_command_arity() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        let shell = FakeShell::default();
        let ctx = context(
            temp_dir.path(),
            "[containers.tool]\nIMAGE = \"acme/tool\"\nCOMMANDS = [[\"init\"]]\n",
            &executor,
            &shell,
        );

        assert!(matches!(run_all(&ctx, &forced()), Err(CraneError::Config(_))));
        assert!(executor.calls().is_empty());
    }
}
