//! Starting daemonized containers
//!
//! A daemonized container is run detached with `sshd` in the foreground so it
//! can later be reached over the remote shell. Each record is written to the
//! store as soon as its container is reachable, so a later failure still
//! leaves the earlier containers known to `destroy`.

use std::collections::BTreeMap;
use std::thread;

use tracing::{debug, info, warn};

use super::ensure_image;
use crate::container::invocation::{with_shell_command, SSHD_COMMAND};
use crate::container::{run_arguments, RunFlags};
use crate::context::Context;
use crate::engine::executor::{ContainerInfo, ExecutionResult, ResultData};
use crate::engine::queries::RuntimeQuery;
use crate::error::{CraneError, Result};
use crate::state::RuntimeRecord;

pub fn start_containers(ctx: &Context, all: bool, force: bool, names: &[String]) -> Result<ExecutionResult> {
    if !all && names.is_empty() {
        return Err(CraneError::InvalidArguments(
            "Not enough arguments provided for the start command. Name the containers or use --all"
                .to_string(),
        ));
    }
    for name in names {
        ctx.config.container(name)?;
    }

    let mut started = BTreeMap::new();
    for (name, spec) in &ctx.config.containers {
        if !all && !names.contains(name) {
            continue;
        }
        if !spec.daemonized {
            if all {
                debug!(container = %name, "skipping container that is not daemonized");
            } else {
                warn!(container = %name, "container is not daemonized, use run or enter instead");
            }
            continue;
        }

        // The id is printed on stdout in detached mode, no id file needed.
        let args = with_shell_command(run_arguments(spec, name, RunFlags::default())?, SSHD_COMMAND);
        ensure_image(ctx, name, spec, force)?;

        let output = ctx.executor.captured(&args)?;
        info!(container = %name, "started container");

        thread::sleep(ctx.settle_delay);

        let output = String::from_utf8_lossy(&output);
        let id = output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string();
        if id.is_empty() {
            return Err(CraneError::process(
                &args,
                b"",
                format!("The runtime returned no id for container '{}'", name),
            ));
        }
        let address = ctx.query().container_address(&id)?;
        debug!(container = %name, id = %id, address = %address, "container is reachable");

        let record = RuntimeRecord::new(id, address);
        ctx.store
            .upsert(&BTreeMap::from([(name.clone(), record.clone())]))?;
        started.insert(name.clone(), record);
    }

    if started.is_empty() {
        let message = "No containers in the Cranefile match the given criteria, none were started";
        info!("{}", message);
        return Ok(ExecutionResult::with_message(ResultData::Containers(Vec::new()), message));
    }

    let containers = started
        .into_iter()
        .map(|(name, record)| ContainerInfo {
            name,
            id: record.id,
            address: record.address,
        })
        .collect();
    Ok(ExecutionResult::new(ResultData::Containers(containers)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, strings, FakeExecutor, FakeShell};
    use tempfile::TempDir;

    const CRANEFILE: &str = r#"
[containers.web]
IMAGE = "acme/web"
DAEMONIZED = true
PORTS = [[8080, 80], [49153, 22]]

[containers.tool]
IMAGE = "acme/tool"
"#;

    #[test]
    fn test_start_daemonized() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        executor
            .reply("run", "4f1c9e\n")
            .reply("inspect", "172.17.0.2\n");
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);

        let result = start_containers(&ctx, false, true, &strings(&["web"])).unwrap();

        assert_eq!(
            executor.calls(),
            vec![
                strings(&[
                    "run",
                    "-i",
                    "--privileged",
                    "-p=8080:80",
                    "-p=49153:22",
                    "-d",
                    "acme/web",
                    "/bin/bash",
                    "-c",
                    "/usr/sbin/sshd -D",
                ]),
                strings(&["inspect", "4f1c9e"]),
            ]
        );
        assert_eq!(
            ctx.store.lookup("web").unwrap(),
            Some(RuntimeRecord::new("4f1c9e", "172.17.0.2"))
        );
        match result.data {
            ResultData::Containers(containers) => assert_eq!(containers[0].address, "172.17.0.2"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_start_all_skips_foreground() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        executor.reply("run", "4f1c9e\n").reply("inspect", "172.17.0.2\n");
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);

        start_containers(&ctx, true, true, &[]).unwrap();
        assert_eq!(executor.verbs(), vec!["run", "inspect"]);
        assert_eq!(ctx.store.lookup("tool").unwrap(), None);
    }

    #[test]
    fn test_start_records_before_later_failure() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        executor
            .reply("run", "id-a\n")
            .fail("run", "boom")
            .reply("inspect", "10.0.0.1\n");
        let shell = FakeShell::default();
        let ctx = context(
            temp_dir.path(),
            "[containers.a]\nIMAGE = \"x\"\nDAEMONIZED = true\n\n[containers.b]\nIMAGE = \"y\"\nDAEMONIZED = true\n",
            &executor,
            &shell,
        );

        let err = start_containers(&ctx, true, true, &[]).unwrap_err();
        assert!(matches!(err, CraneError::Process { .. }));
        assert_eq!(executor.verbs(), vec!["run", "inspect", "run"]);
        assert_eq!(
            ctx.store.lookup("a").unwrap(),
            Some(RuntimeRecord::new("id-a", "10.0.0.1"))
        );
        assert_eq!(ctx.store.lookup("b").unwrap(), None);
    }

    #[test]
    fn test_start_nothing_matches() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);

        let result = start_containers(&ctx, false, true, &strings(&["tool"])).unwrap();
        assert!(result.message.is_some());
        assert!(executor.calls().is_empty());
        assert!(ctx.store.records().unwrap().is_empty());
    }

    #[test]
    fn test_start_missing_address_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        executor.reply("run", "4f1c9e\n").reply("inspect", "\n");
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);

        let err = start_containers(&ctx, false, true, &strings(&["web"])).unwrap_err();
        assert!(matches!(err, CraneError::Process { .. }));
        assert!(ctx.store.records().unwrap().is_empty());
    }

    #[test]
    fn test_start_bad_port_arity_spawns_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        let shell = FakeShell::default();
        let ctx = context(
            temp_dir.path(),
            "[containers.web]\nIMAGE = \"acme/web\"\nDAEMONIZED = true\nPORTS = [[8080]]\n",
            &executor,
            &shell,
        );

        let err = start_containers(&ctx, true, false, &[]).unwrap_err();
        assert!(matches!(err, CraneError::Config(_)));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn test_start_requires_names() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);

        assert!(matches!(
            start_containers(&ctx, false, false, &[]),
            Err(CraneError::InvalidArguments(_))
        ));
    }
}
