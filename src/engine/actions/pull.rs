//! Pulling images from the public registry

use tracing::info;

use super::ActionResult;
use crate::container::invocation::{verb_arguments, PULL};
use crate::context::Context;
use crate::engine::executor::{ExecutionResult, ResultData};
use crate::error::{CraneError, Result};

/// Pull the given images, or every configured image with `all`
pub fn pull_images(ctx: &Context, all: bool, images: &[String]) -> Result<ExecutionResult> {
    let images = if all { ctx.config.images() } else { images.to_vec() };
    if images.is_empty() {
        return Err(CraneError::InvalidArguments(
            "No images to pull. Name the images or use --all".to_string(),
        ));
    }

    for image in &images {
        info!(image = %image, "pulling image");
        ctx.executor.captured(&verb_arguments(PULL, &[image]))?;
    }

    Ok(ExecutionResult::with_message(
        ResultData::ActionResult(ActionResult::new("pull", images)),
        "Successfully pulled the following images",
    ))
}
