//! Text-backed record store
//!
//! The state file is TOML-shaped, but it is edited line by line so that any
//! block or comment Crane does not touch survives byte for byte. Each record is
//! exactly three lines:
//!
//! ```text
//! [statecontainers.web]
//! ID = "4f1c..."
//! IP = "172.17.0.2"
//! ```
//!
//! Every mutation reads the whole file, rewrites it into a temporary file and
//! renames that over the original.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use super::RuntimeRecord;
use crate::error::{CraneError, Result};

/// File name of the state store
pub const STATE_FILE: &str = ".crane";

const SECTION: &str = "statecontainers";
const ID_KEY: &str = "ID";
const IP_KEY: &str = "IP";

/// Lines that follow a record header
const RECORD_BODY_LINES: usize = 2;

#[derive(Debug, Default, Deserialize)]
struct StateDocument {
    #[serde(default)]
    statecontainers: BTreeMap<String, RuntimeRecord>,
}

/// Name to `RuntimeRecord` store backed by a single text file
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store kept in `STATE_FILE` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty store if none exists
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "creating new state file");
            self.reset()?;
        }
        Ok(())
    }

    /// Replace the store with an empty one
    pub fn reset(&self) -> Result<()> {
        self.write(&format!("[{}]\n", SECTION))
    }

    /// Insert or overwrite records.
    ///
    /// Existing blocks get their id and address lines replaced in place, unknown
    /// names are appended as new blocks, everything else is copied through.
    pub fn upsert(&self, records: &BTreeMap<String, RuntimeRecord>) -> Result<()> {
        self.ensure_exists()?;
        let content = self.read()?;
        self.write(&upsert_text(&content, records))?;
        debug!(containers = ?records.keys().collect::<Vec<_>>(), "updated state file");
        Ok(())
    }

    /// Drop the blocks of the given containers
    pub fn remove(&self, names: &BTreeSet<String>) -> Result<()> {
        let content = self.read()?;
        self.write(&remove_text(&content, names))?;
        debug!(containers = ?names, "removed containers from state file");
        Ok(())
    }

    /// Record of a container, if one was stored
    pub fn lookup(&self, name: &str) -> Result<Option<RuntimeRecord>> {
        Ok(self.records()?.remove(name))
    }

    /// Record of a container that must have been started before
    pub fn require(&self, name: &str) -> Result<RuntimeRecord> {
        let record = self.lookup(name)?.ok_or_else(|| {
            CraneError::State(format!(
                "Container '{}' does not exist in the state file. Start it first",
                name
            ))
        })?;

        if record.id.is_empty() {
            return Err(CraneError::State(format!("Container '{}' has an empty ID", name)));
        }
        if record.address.is_empty() {
            return Err(CraneError::State(format!("Container '{}' has an empty IP", name)));
        }
        Ok(record)
    }

    /// Every stored record, keyed by container name
    pub fn records(&self) -> Result<BTreeMap<String, RuntimeRecord>> {
        let content = self.read()?;
        let document: StateDocument = toml::from_str(&content).map_err(|e| {
            CraneError::State(format!(
                "Failed to decode state file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(document.statecontainers)
    }

    fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(CraneError::IoError)
    }

    fn write(&self, content: &str) -> Result<()> {
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// Record being rewritten, with the key lines already replaced
struct Pending<'a> {
    record: &'a RuntimeRecord,
    id_written: bool,
    address_written: bool,
}

/// Rewrite `content` with `records` upserted
fn upsert_text(content: &str, records: &BTreeMap<String, RuntimeRecord>) -> String {

    let headers: BTreeMap<String, &str> = records
        .keys()
        .map(|name| (header_line(name), name.as_str()))
        .collect();

    let mut output = String::with_capacity(content.len());
    let mut updated: BTreeSet<&str> = BTreeSet::new();
    let mut pending: Option<Pending> = None;

    for line in content.split_inclusive('\n') {
        let (body, ending) = split_line_ending(line);
        let trimmed = body.trim();

        if trimmed.starts_with('[') {
            finish_block(&mut output, pending.take());
            pending = headers.get(trimmed).map(|name| {
                updated.insert(*name);
                Pending {
                    record: &records[*name],
                    id_written: false,
                    address_written: false,
                }
            });
            output.push_str(line);
            continue;
        }

        if let Some(current) = pending.as_mut() {
            if !current.id_written && is_key_line(trimmed, ID_KEY) {
                output.push_str(&key_line(ID_KEY, &current.record.id));
                output.push_str(ending);
                current.id_written = true;
                continue;
            }
            if !current.address_written && is_key_line(trimmed, IP_KEY) {
                output.push_str(&key_line(IP_KEY, &current.record.address));
                output.push_str(ending);
                current.address_written = true;
                continue;
            }
        }

        output.push_str(line);
    }
    finish_block(&mut output, pending.take());

    for (name, record) in records {
        if updated.contains(name.as_str()) {
            continue;
        }
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        debug!(container = %name, "adding new container to state file");
        for line in record_lines(name, record) {
            output.push_str(&line);
            output.push('\n');
        }
    }

    output
}

/// Append the key lines a matched block was missing (hand-edited files)
fn finish_block(output: &mut String, pending: Option<Pending>) {
    let Some(current) = pending else {
        return;
    };
    let mut missing = Vec::new();
    if !current.id_written {
        missing.push(key_line(ID_KEY, &current.record.id));
    }
    if !current.address_written {
        missing.push(key_line(IP_KEY, &current.record.address));
    }
    if missing.is_empty() {
        return;
    }

    warn!(missing = ?missing, "state block was incomplete, adding missing keys");
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    for line in missing {
        output.push_str(&line);
        output.push('\n');
    }
}

/// Rewrite `content` without the blocks of `names`.
///
/// A matching header drops itself and the next two lines unconditionally.
fn remove_text(content: &str, names: &BTreeSet<String>) -> String {
    let headers: BTreeSet<String> = names.iter().map(|name| header_line(name)).collect();

    let mut output = String::with_capacity(content.len());
    let mut skip = 0;

    for line in content.split_inclusive('\n') {
        if skip > 0 {
            skip -= 1;
            continue;
        }
        if headers.contains(line.trim()) {
            skip = RECORD_BODY_LINES;
            continue;
        }
        output.push_str(line);
    }

    output
}

fn record_lines(name: &str, record: &RuntimeRecord) -> [String; 3] {
    [
        header_line(name),
        key_line(ID_KEY, &record.id),
        key_line(IP_KEY, &record.address),
    ]
}

fn header_line(name: &str) -> String {
    format!("[{}.{}]", SECTION, toml_key(name))
}

fn key_line(key: &str, value: &str) -> String {
    format!("{} = {}", key, toml::Value::String(value.to_string()))
}

fn toml_key(name: &str) -> String {
    let bare = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        name.to_string()
    } else {
        toml::Value::String(name.to_string()).to_string()
    }
}

fn is_key_line(trimmed: &str, key: &str) -> bool {
    trimmed
        .strip_prefix(key)
        .map(|rest| rest.trim_start().starts_with('='))
        .unwrap_or(false)
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}
