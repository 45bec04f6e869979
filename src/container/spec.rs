//! Declarative container description
//!
//! A `ContainerSpec` is one `[containers.<name>]` table of the Cranefile. It is
//! loaded once per invocation and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Declared container as written in the Cranefile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", default)]
pub struct ContainerSpec {
    /// Image the container runs from
    pub image: String,
    /// Build context used by `crane build`
    pub dockerfile: String,
    /// Kept for compatibility with existing Cranefiles; not used when running
    pub graphical: bool,
    /// Detached and reached over SSH, instead of run in the foreground
    pub daemonized: bool,
    /// Working directory inside the container
    pub cwd: String,
    /// DNS server handed to the runtime
    pub dns: String,
    pub username: String,
    pub password: String,
    /// `[host, container]` port pairs
    pub ports: Vec<Vec<i64>>,
    /// `[host path, container path, mode]` triples
    pub mountpoints: Vec<Vec<String>>,
    /// `[label, shell command]` pairs
    pub commands: Vec<Vec<String>>,
}

impl ContainerSpec {
    /// Look up a named command from the command table.
    ///
    /// Every pair up to the match is arity-checked, the same as when all
    /// commands are collected.
    pub fn command(&self, label: &str) -> crate::Result<Option<&str>> {
        for (index, pair) in self.commands.iter().enumerate() {
            check_command_pair(index, pair)?;
            if pair[0] == label {
                return Ok(Some(pair[1].as_str()));
            }
        }
        Ok(None)
    }

    /// All shell commands of the command table, in declaration order
    pub fn all_commands(&self) -> crate::Result<Vec<&str>> {
        self.commands
            .iter()
            .enumerate()
            .map(|(index, pair)| {
                check_command_pair(index, pair)?;
                Ok(pair[1].as_str())
            })
            .collect()
    }
}

const COMMAND_ARGUMENT_COUNT: usize = 2;

fn check_command_pair(index: usize, pair: &[String]) -> crate::Result<()> {
    if pair.len() != COMMAND_ARGUMENT_COUNT {
        return Err(crate::CraneError::Config(format!(
            "Wrong amount of command arguments for pair nr {}: expected {}, actual {}. \
             Use \"<command1>;<command2>\" to chain several commands under one label",
            index,
            COMMAND_ARGUMENT_COUNT,
            pair.len()
        )));
    }
    Ok(())
}
