//! Image builds from Dockerfiles

use tracing::info;

use super::{build_image, chosen_containers, ActionResult};
use crate::context::Context;
use crate::engine::executor::{ExecutionResult, ResultData};
use crate::error::Result;

/// Build the images of the chosen containers, or of all with `all`
pub fn build_images(ctx: &Context, all: bool, names: &[String]) -> Result<ExecutionResult> {
    let containers = chosen_containers(&ctx.config, all, names)?;

    let mut images = Vec::new();
    for name in &containers {
        let spec = ctx.config.container(name)?;
        build_image(ctx, name, spec)?;
        images.push(spec.image.trim().to_string());
    }

    info!(images = ?images, "built images");
    Ok(ExecutionResult::with_message(
        ResultData::ActionResult(ActionResult::new("build", images)),
        "Successfully built the following images",
    ))
}
