//! Per-invocation context
//!
//! Everything an orchestrator needs is carried by an explicitly built
//! `Context`: the decoded Cranefile, the state store, the work directory and
//! the two seams to the outside world (runtime executor and remote shell).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::config::{Config, CONFIGURATION_FILE};
use crate::container::invocation::{id_file_name, ID_FILE_PREFIX};
use crate::engine::queries::CliQuery;
use crate::error::{CraneError, Result};
use crate::process::{ProcessExecutor, RemoteShell};
use crate::state::StateStore;

/// Pause between starting a daemonized container and asking for its address
pub const START_SETTLE_DELAY: Duration = Duration::from_secs(1);

pub struct Context<'a> {
    pub config: Config,
    pub store: StateStore,
    work_dir: PathBuf,
    pub executor: &'a dyn ProcessExecutor,
    pub shell: &'a dyn RemoteShell,
    pub settle_delay: Duration,
}

impl<'a> Context<'a> {
    pub fn new(
        config: Config,
        work_dir: impl Into<PathBuf>,
        executor: &'a dyn ProcessExecutor,
        shell: &'a dyn RemoteShell,
    ) -> Self {
        let work_dir = work_dir.into();
        Self {
            config,
            store: StateStore::in_dir(&work_dir),
            work_dir,
            executor,
            shell,
            settle_delay: START_SETTLE_DELAY,
        }
    }

    /// Prepare the work directory and load the Cranefile.
    ///
    /// Sweeps id files left by crashed runs, creates the state file if needed
    /// and writes an example Cranefile when none exists.
    pub fn load(
        work_dir: &Path,
        executor: &'a dyn ProcessExecutor,
        shell: &'a dyn RemoteShell,
    ) -> Result<Self> {
        sweep_id_files(work_dir)?;

        let context = Self::new(
            Config::load_or_create(&work_dir.join(CONFIGURATION_FILE))?,
            work_dir,
            executor,
            shell,
        );
        context.store.ensure_exists()?;
        Ok(context)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn query(&self) -> CliQuery<'a> {
        CliQuery::new(self.executor)
    }

    /// Read the id the runtime wrote for a container, then delete the file
    pub fn take_container_id(&self, container_name: &str) -> Result<String> {
        let path = self.work_dir.join(id_file_name(container_name));
        let content = fs::read_to_string(&path).map_err(|e| {
            CraneError::State(format!(
                "Failed to read the id of container '{}' from {}: {}",
                container_name,
                path.display(),
                e
            ))
        })?;
        fs::remove_file(&path)?;

        let id = content.lines().next().unwrap_or_default().trim().to_string();
        if id.is_empty() {
            return Err(CraneError::State(format!(
                "Id file {} of container '{}' is empty",
                path.display(),
                container_name
            )));
        }
        debug!(container = %container_name, id = %id, "retrieved container id from file");
        Ok(id)
    }
}

/// Delete id files left in `dir` by earlier runs; returns what was removed
pub fn sweep_id_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    if !dir.is_dir() {
        return Ok(removed);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_id_file = path
            .file_name()
            .map(|name| name.to_string_lossy().starts_with(ID_FILE_PREFIX))
            .unwrap_or(false);

        if is_id_file && path.is_file() {
            fs::remove_file(&path)?;
            debug!(path = %path.display(), "removed orphaned id file");
            removed.push(path);
        }
    }
    Ok(removed)
}
