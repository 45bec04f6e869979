//! Committing containers into images

use tracing::info;

use crate::container::invocation::commit_arguments;
use crate::context::Context;
use crate::engine::executor::{ExecutionResult, FrozenImage, ResultData};
use crate::error::{CraneError, Result};

/// Separates a container name from the image to freeze it into
pub const FREEZE_DELIMITER: &str = "::";

/// Freeze each `<name>[::<image>]` target, or every declared container with `all`
pub fn freeze_containers(ctx: &Context, all: bool, targets: &[String]) -> Result<ExecutionResult> {
    let mut targets = targets.to_vec();
    if all {
        targets.extend(ctx.config.names());
    } else if targets.is_empty() {
        return Err(CraneError::InvalidArguments(
            "No arguments provided for the freeze command".to_string(),
        ));
    }

    let mut frozen = Vec::new();
    for target in &targets {
        let (container, image) = split_target(target)?;
        frozen.push(freeze_container(ctx, container, image)?);
    }
    Ok(ExecutionResult::new(ResultData::Frozen(frozen)))
}

/// Commit a started container into `image`, or over its configured image
pub fn freeze_container(ctx: &Context, container_name: &str, image: Option<&str>) -> Result<FrozenImage> {
    let image = match image {
        Some(image) => image.to_string(),
        None => {
            let configured = ctx.config.container(container_name)?.image.trim();
            if configured.is_empty() {
                return Err(CraneError::Config(format!(
                    "No image was specified for container '{}'",
                    container_name
                )));
            }
            configured.to_string()
        }
    };
    let record = ctx.store.require(container_name)?;

    let output = ctx.executor.captured(&commit_arguments(&record.id, &image))?;
    let image_id = String::from_utf8_lossy(&output).trim().to_string();
    info!(container = %container_name, image = %image, image_id = %image_id, "froze container");

    Ok(FrozenImage {
        container: container_name.to_string(),
        image,
        image_id,
    })
}

fn split_target(target: &str) -> Result<(&str, Option<&str>)> {
    let parts: Vec<&str> = target.split(FREEZE_DELIMITER).collect();
    match parts.as_slice() {
        [container] => Ok((*container, None)),
        [container, image] if !container.is_empty() && !image.is_empty() => Ok((*container, Some(*image))),
        _ => Err(CraneError::InvalidArguments(format!(
            "Invalid freeze target '{}', expected <container>{}<image>",
            target, FREEZE_DELIMITER
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RuntimeRecord;
    use crate::testing::{context, strings, FakeExecutor, FakeShell};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    const CRANEFILE: &str = r#"
[containers.web]
IMAGE = "acme/web"

[containers.db]
IMAGE = "postgres"
"#;

    fn store_records(ctx: &Context, names: &[&str]) {
        let records: BTreeMap<String, RuntimeRecord> = names
            .iter()
            .map(|name| (name.to_string(), RuntimeRecord::foreground(format!("id-{}", name))))
            .collect();
        ctx.store.upsert(&records).unwrap();
    }

    #[test]
    fn test_split_target() {
        assert_eq!(split_target("web").unwrap(), ("web", None));
        assert_eq!(split_target("web::acme/web:v2").unwrap(), ("web", Some("acme/web:v2")));
        assert!(split_target("web::a::b").is_err());
        assert!(split_target("web::").is_err());
    }

    #[test]
    fn test_freeze_over_configured_image() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        executor.reply("commit", "sha256:1234\n");
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);
        store_records(&ctx, &["web"]);

        let result = freeze_containers(&ctx, false, &strings(&["web"])).unwrap();
        assert_eq!(executor.calls(), vec![strings(&["commit", "id-web", "acme/web"])]);
        match result.data {
            ResultData::Frozen(frozen) => assert_eq!(frozen[0].image_id, "sha256:1234"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_freeze_into_named_image() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);
        store_records(&ctx, &["db"]);

        freeze_containers(&ctx, false, &strings(&["db::snapshot"])).unwrap();
        assert_eq!(executor.calls(), vec![strings(&["commit", "id-db", "snapshot"])]);
    }

    #[test]
    fn test_freeze_all_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);
        store_records(&ctx, &["web", "db"]);

        freeze_containers(&ctx, true, &[]).unwrap();
        let ids: Vec<String> = executor.calls().iter().map(|call| call[1].clone()).collect();
        assert_eq!(ids, vec!["id-db", "id-web"]);
    }

    #[test]
    fn test_freeze_requires_record() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);

        let err = freeze_containers(&ctx, false, &strings(&["web"])).unwrap_err();
        assert!(matches!(err, CraneError::State(_)));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn test_freeze_requires_targets() {
        let temp_dir = TempDir::new().unwrap();
        let executor = FakeExecutor::new();
        let shell = FakeShell::default();
        let ctx = context(temp_dir.path(), CRANEFILE, &executor, &shell);

        assert!(matches!(
            freeze_containers(&ctx, false, &[]),
            Err(CraneError::InvalidArguments(_))
        ));
    }
}
