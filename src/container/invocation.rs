//! Runtime argument synthesis
//!
//! Turns a `ContainerSpec` plus two run-time modifiers into the exact argument
//! vector handed to the container runtime. The order of the flags is fixed:
//!
//! 1. `run`
//! 2. `-i --privileged`
//! 3. `--cidfile=<file>` when the id must come back through a side-channel file
//! 4. `--dns=<server>` when declared
//! 5. `-w=<dir>` when declared
//! 6. one `-p=<host>:<container>` per port pair
//! 7. `-d` for daemonized containers, otherwise `-t` when a TTY is wanted
//! 8. one `-v=<host>:<container>:<mode>` per mountpoint
//! 9. the image
//!
//! Nothing here touches the filesystem or spawns a process, so every
//! configuration error is reported before the runtime is ever invoked.

use tracing::debug;

use super::spec::ContainerSpec;
use crate::error::{CraneError, Result};

pub const RUN: &str = "run";
pub const BUILD: &str = "build";
pub const COMMIT: &str = "commit";
pub const PULL: &str = "pull";
pub const KILL: &str = "kill";
pub const REMOVE: &str = "rm";
pub const REMOVE_IMAGE: &str = "rmi";
pub const IMAGES: &str = "images";
pub const SEARCH: &str = "search";
pub const INSPECT: &str = "inspect";

const INTERACTIVE_OPTION: &str = "-i";
const PRIVILEGED_OPTION: &str = "--privileged";
const CID_OPTION: &str = "--cidfile=";
const DNS_OPTION: &str = "--dns=";
const WORKING_DIR_OPTION: &str = "-w=";
const PORT_OPTION: &str = "-p=";
const DETACH_OPTION: &str = "-d";
const TTY_OPTION: &str = "-t";
const VOLUME_OPTION: &str = "-v=";
const BUILD_TAG_OPTION: &str = "-t";

const PORTS_ARGUMENT_COUNT: usize = 2;
const MOUNTPOINTS_ARGUMENT_COUNT: usize = 3;

/// Prefix of the file the runtime writes a new container's id into
pub const ID_FILE_PREFIX: &str = ".cidfile";

/// Shell used for every command executed inside a container
pub const SHELL: &str = "/bin/bash";
pub const SHELL_STRING_OPTION: &str = "-c";
/// Foreground process of a daemonized container
pub const SSHD_COMMAND: &str = "/usr/sbin/sshd -D";

/// Run-time modifiers of a `run` invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunFlags {
    /// Allocate a TTY (ignored for daemonized containers)
    pub interactive_tty: bool,
    /// Ask the runtime to write the container id into the id file
    pub identifier_file: bool,
}

/// Name of the id file for a container
pub fn id_file_name(container_name: &str) -> String {
    format!("{}{}", ID_FILE_PREFIX, container_name)
}

/// Build the `run` argument vector for a container.
///
/// Fails on a port pair that is not exactly 2 long, a mountpoint that is not
/// exactly 3 long, or a blank image.
pub fn run_arguments(spec: &ContainerSpec, container_name: &str, flags: RunFlags) -> Result<Vec<String>> {
    let mut args = vec![RUN.to_string()];

    args.push(INTERACTIVE_OPTION.to_string());
    args.push(PRIVILEGED_OPTION.to_string());

    if flags.identifier_file {
        let file_name = id_file_name(container_name);
        debug!(container = %container_name, file = %file_name, "capturing container id through file");
        args.push(format!("{}{}", CID_OPTION, file_name));
    }

    if let Some(dns) = non_blank(&spec.dns) {
        args.push(format!("{}{}", DNS_OPTION, dns));
    }

    if let Some(cwd) = non_blank(&spec.cwd) {
        args.push(format!("{}{}", WORKING_DIR_OPTION, cwd));
    }

    args.extend(port_options(&spec.ports)?);

    if spec.daemonized {
        args.push(DETACH_OPTION.to_string());
    } else if flags.interactive_tty {
        args.push(TTY_OPTION.to_string());
    }

    args.extend(mountpoint_options(&spec.mountpoints)?);

    match non_blank(&spec.image) {
        Some(image) => args.push(image.to_string()),
        None => {
            return Err(CraneError::Config(format!(
                "No image was specified for container '{}'",
                container_name
            )))
        }
    }

    debug!(container = %container_name, args = ?args, "synthesized run invocation");
    Ok(args)
}

/// Append `/bin/bash -c <command>` to a run invocation
pub fn with_shell_command(mut args: Vec<String>, command: &str) -> Vec<String> {
    args.push(SHELL.to_string());
    args.push(SHELL_STRING_OPTION.to_string());
    args.push(command.to_string());
    args
}

/// `build -t <image> <dockerfile>`
pub fn build_arguments(image: &str, dockerfile: &str) -> Vec<String> {
    vec![
        BUILD.to_string(),
        BUILD_TAG_OPTION.to_string(),
        image.to_string(),
        dockerfile.to_string(),
    ]
}

/// `commit <id> <image>`
pub fn commit_arguments(container_id: &str, image: &str) -> Vec<String> {
    vec![COMMIT.to_string(), container_id.to_string(), image.to_string()]
}

/// `<verb> <target>...`, e.g. `kill id1 id2`
pub fn verb_arguments<S: AsRef<str>>(verb: &str, targets: &[S]) -> Vec<String> {
    std::iter::once(verb.to_string())
        .chain(targets.iter().map(|t| t.as_ref().to_string()))
        .collect()
}

fn port_options(ports: &[Vec<i64>]) -> Result<Vec<String>> {
    ports
        .iter()
        .enumerate()
        .map(|(index, pair)| {
            if pair.len() != PORTS_ARGUMENT_COUNT {
                return Err(CraneError::Config(format!(
                    "Wrong amount of port arguments for pair nr {}: expected {}, actual {}",
                    index,
                    PORTS_ARGUMENT_COUNT,
                    pair.len()
                )));
            }
            Ok(format!("{}{}:{}", PORT_OPTION, pair[0], pair[1]))
        })
        .collect()
}

fn mountpoint_options(mountpoints: &[Vec<String>]) -> Result<Vec<String>> {
    mountpoints
        .iter()
        .enumerate()
        .map(|(index, triple)| {
            if triple.len() != MOUNTPOINTS_ARGUMENT_COUNT {
                return Err(CraneError::Config(format!(
                    "Wrong amount of mountpoint arguments for entry nr {}: expected {}, actual {}",
                    index,
                    MOUNTPOINTS_ARGUMENT_COUNT,
                    triple.len()
                )));
            }
            Ok(format!("{}{}", VOLUME_OPTION, triple.join(":")))
        })
        .collect()
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
