//! Action implementations (sub-commands that touch the runtime or the state)

pub mod build;
pub mod create;
pub mod destroy;
pub mod enter;
pub mod freeze;
pub mod pull;
pub mod rmi;
pub mod run;
pub mod runall;
pub mod start;

pub use build::build_images;
pub use create::create_project;
pub use destroy::destroy_containers;
pub use enter::enter_container;
pub use freeze::freeze_containers;
pub use pull::pull_images;
pub use rmi::remove_images;
pub use run::{run_commands, RunOptions};
pub use runall::{run_all, RunallOptions};
pub use start::start_containers;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::container::invocation::build_arguments;
use crate::container::ContainerSpec;
use crate::context::Context;
use crate::engine::queries::RuntimeQuery;
use crate::error::{CraneError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_type: String,
    pub affected_count: usize,
    pub details: Vec<String>,
}

impl ActionResult {
    pub fn new(action_type: &str, details: Vec<String>) -> Self {
        Self {
            action_type: action_type.to_string(),
            affected_count: details.len(),
            details,
        }
    }
}

/// Names a sub-command works on: every declared container with `all`,
/// otherwise the given names, each of which must be declared
pub(crate) fn chosen_containers(config: &Config, all: bool, names: &[String]) -> Result<Vec<String>> {
    if all {
        return Ok(config.names());
    }
    if names.is_empty() {
        return Err(CraneError::InvalidArguments(
            "No container names provided. Name the containers or use --all".to_string(),
        ));
    }
    for name in names {
        config.container(name)?;
    }
    Ok(names.to_vec())
}

/// Build the image of a container from its Dockerfile
pub(crate) fn build_image(ctx: &Context, container_name: &str, spec: &ContainerSpec) -> Result<()> {
    let image = spec.image.trim();
    let dockerfile = spec.dockerfile.trim();
    if image.is_empty() {
        return Err(CraneError::Config(format!(
            "No image name was specified for container '{}'",
            container_name
        )));
    }
    if dockerfile.is_empty() {
        return Err(CraneError::Config(format!(
            "No Dockerfile path was specified for container '{}'",
            container_name
        )));
    }

    info!(container = %container_name, image, dockerfile, "building image");
    let output = ctx.executor.captured(&build_arguments(image, dockerfile))?;
    debug!(image, output = %String::from_utf8_lossy(&output), "build finished");
    Ok(())
}

/// Build the image unless it exists locally or in the public registry.
///
/// With `force` the host's image is assumed to exist and nothing is checked.
pub(crate) fn ensure_image(ctx: &Context, container_name: &str, spec: &ContainerSpec, force: bool) -> Result<()> {
    if force {
        debug!(container = %container_name, "force option set, using the host's image");
        return Ok(());
    }

    let query = ctx.query();
    let image = spec.image.trim();
    if query.image_exists_locally(image)? || query.image_in_registry(image)? {
        return Ok(());
    }
    build_image(ctx, container_name, spec)
}
