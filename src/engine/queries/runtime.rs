//! Questions asked of the container runtime
//!
//! The runtime only answers in free text, so each answer is scraped with a
//! fixed contract:
//!
//! - `images <name>` lists the image name when it exists locally
//! - `search <name>` prints `Found 0 results matching your query` (or only
//!   the table header) when the registry has no such image
//! - `inspect <id> | grep IPAddress | cut -d" -f4` yields the address as the
//!   first non-empty line

use tracing::debug;

use crate::container::invocation::{IMAGES, INSPECT, SEARCH};
use crate::error::{CraneError, Result};
use crate::process::ProcessExecutor;

/// Marker printed by `search` when nothing matched
pub const NO_SEARCH_RESULTS: &str = "Found 0 results matching your query";

const ADDRESS_FIELD: &str = "IPAddress";
const ADDRESS_DELIMITER: &str = "\"";
const ADDRESS_TOKEN: &str = "4";

pub trait RuntimeQuery {
    /// Whether the image is present on this host
    fn image_exists_locally(&self, image: &str) -> Result<bool>;

    /// Whether the public registry knows the image
    fn image_in_registry(&self, image: &str) -> Result<bool>;

    /// Network address of a running container
    fn container_address(&self, container_id: &str) -> Result<String>;
}

/// `RuntimeQuery` answered by the runtime's command line
pub struct CliQuery<'a> {
    executor: &'a dyn ProcessExecutor,
}

impl<'a> CliQuery<'a> {
    pub fn new(executor: &'a dyn ProcessExecutor) -> Self {
        Self { executor }
    }
}

impl RuntimeQuery for CliQuery<'_> {
    fn image_exists_locally(&self, image: &str) -> Result<bool> {
        let output = self.executor.captured(&[IMAGES.to_string(), image.to_string()])?;
        let exists = images_lists(&String::from_utf8_lossy(&output), image);
        debug!(image, exists, "checked local images");
        Ok(exists)
    }

    fn image_in_registry(&self, image: &str) -> Result<bool> {
        let output = self.executor.captured(&[SEARCH.to_string(), image.to_string()])?;
        let found = !search_is_empty(&String::from_utf8_lossy(&output));
        debug!(image, found, "searched public registry");
        Ok(found)
    }

    fn container_address(&self, container_id: &str) -> Result<String> {
        let args = [INSPECT.to_string(), container_id.to_string()];
        let filters = [
            vec!["grep".to_string(), ADDRESS_FIELD.to_string()],
            vec![
                "cut".to_string(),
                format!("-d{}", ADDRESS_DELIMITER),
                format!("-f{}", ADDRESS_TOKEN),
            ],
        ];
        let output = self.executor.pipeline(&args, &filters)?;

        first_address(&output).ok_or_else(|| CraneError::Process {
            command: format!("{} {}", INSPECT, container_id),
            output: output.trim().to_string(),
            host: format!(
                "Failed to obtain the IP address of container {}. Is it still running?",
                container_id
            ),
        })
    }
}

/// `images <name>` output mentions the image
pub fn images_lists(output: &str, image: &str) -> bool {
    output.contains(image)
}

/// `search <name>` output carries no results
pub fn search_is_empty(output: &str) -> bool {
    if output.contains(NO_SEARCH_RESULTS) {
        return true;
    }
    // Newer clients print just the table header.
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .all(|line| line.starts_with("NAME"))
}

/// First non-empty line of the `cut` output
pub fn first_address(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
