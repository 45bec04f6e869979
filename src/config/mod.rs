//! Cranefile loading
//!
//! The Cranefile is a TOML document with a single `[containers]` table. When
//! the file does not exist yet a documented example is written in its place.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::container::ContainerSpec;
use crate::error::{CraneError, Result};

/// File name of the declarative configuration
pub const CONFIGURATION_FILE: &str = "Cranefile.toml";

const EXAMPLE_CRANEFILE: &str = r#"[containers]

[containers.firstContainer]
IMAGE = "orobix/sshfs_startup_key2"
DOCKERFILE = "."
GRAPHICAL = true
DAEMONIZED = false
CWD = "/home/foo" # Leave empty if not needed
DNS = "" # Leave empty if not needed
PASSWORD = "orobix2013" # Leave empty if not needed
USERNAME = "root"
PORTS = [[49153, 22]] # Port 22 is required for daemonized containers (SSH)
MOUNTPOINTS = [] # [["<host path>", "<container path>", "<rw|ro>"]]
COMMANDS = [["init", "echo orobix"]]
"#;

/// Declared containers, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub containers: BTreeMap<String, ContainerSpec>,
}

impl Config {
    /// Parse a Cranefile document
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the Cranefile at `path`, writing the example first if it is absent
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no configuration file found, writing an example");
            write_example(path)?;
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        debug!(containers = ?config.containers.keys().collect::<Vec<_>>(), "decoded configuration");
        Ok(config)
    }

    /// Spec of a declared container; unknown names are a configuration error
    pub fn container(&self, name: &str) -> Result<&ContainerSpec> {
        self.containers.get(name).ok_or_else(|| {
            CraneError::Config(format!(
                "Container '{}' does not exist in the configuration file",
                name
            ))
        })
    }

    /// Names of all declared containers, sorted
    pub fn names(&self) -> Vec<String> {
        self.containers.keys().cloned().collect()
    }

    /// Distinct images of all declared containers, sorted
    pub fn images(&self) -> Vec<String> {
        let mut images: Vec<String> = self
            .containers
            .values()
            .map(|spec| spec.image.trim().to_string())
            .filter(|image| !image.is_empty())
            .collect();
        images.sort();
        images.dedup();
        images
    }
}

/// Write the example Cranefile, replacing any existing one
pub fn write_example(path: &Path) -> Result<()> {
    fs::write(path, EXAMPLE_CRANEFILE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_example_parses() {
        let config = Config::parse(EXAMPLE_CRANEFILE).unwrap();
        let spec = config.container("firstContainer").unwrap();
        assert_eq!(spec.image, "orobix/sshfs_startup_key2");
        assert_eq!(spec.ports, vec![vec![49153, 22]]);
        assert_eq!(spec.commands[0], vec!["init", "echo orobix"]);
    }

    #[test]
    fn test_load_creates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIGURATION_FILE);

        let config = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.names(), vec!["firstContainer"]);
    }

    #[test]
    fn test_load_keeps_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIGURATION_FILE);
        fs::write(&path, "[containers.db]\nIMAGE = \"postgres\"\n").unwrap();

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config.names(), vec!["db"]);
    }

    #[test]
    fn test_unknown_container() {
        let config = Config::default();
        assert!(matches!(config.container("nope"), Err(CraneError::Config(_))));
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            Config::parse("[containers.db]\nPORTS = \"eighty\"\n"),
            Err(CraneError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_images_sorted_and_distinct() {
        let config = Config::parse(
            r#"
[containers.b]
IMAGE = "redis"
[containers.a]
IMAGE = "base"
[containers.c]
IMAGE = "redis"
[containers.d]
DOCKERFILE = "."
"#,
        )
        .unwrap();
        assert_eq!(config.names(), vec!["a", "b", "c", "d"]);
        assert_eq!(config.images(), vec!["base", "redis"]);
    }
}
