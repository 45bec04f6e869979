//! Removing images from the host

use tracing::info;

use super::ActionResult;
use crate::container::invocation::{verb_arguments, REMOVE_IMAGE};
use crate::context::Context;
use crate::engine::executor::{ExecutionResult, ResultData};
use crate::error::{CraneError, Result};

/// Remove the given images, or every configured image with `all`, in a single
/// runtime invocation
pub fn remove_images(ctx: &Context, all: bool, images: &[String]) -> Result<ExecutionResult> {
    let images = if all { ctx.config.images() } else { images.to_vec() };
    if images.is_empty() {
        return Err(CraneError::InvalidArguments(
            "No images to remove. Name the images or use --all".to_string(),
        ));
    }

    let output = ctx.executor.captured(&verb_arguments(REMOVE_IMAGE, &images))?;
    info!(output = %String::from_utf8_lossy(&output).trim(), "removed images");

    Ok(ExecutionResult::new(ResultData::ActionResult(ActionResult::new(
        "rmi", images,
    ))))
}
