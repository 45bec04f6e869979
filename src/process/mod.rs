//! External process execution
//!
//! Every runtime invocation goes through a privilege-elevation wrapper
//! (`sudo docker <args>`). Three disciplines are offered:
//!
//! - **captured**: wait for the process and return its output
//! - **streaming**: hand the terminal to the process and return at once
//! - **pipeline**: feed the runtime's output through host filters
//!
//! Orchestrators only see the `ProcessExecutor` trait, so tests can record
//! invocations instead of spawning anything.

mod ssh;

pub use ssh::{ssh_arguments, RemoteShell, SshShell};

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use tracing::debug;

use crate::error::{CraneError, Result};

pub const DEFAULT_RUNTIME: &str = "docker";
pub const DEFAULT_ELEVATE: &str = "sudo";

/// Runs the container runtime binary
pub trait ProcessExecutor {
    /// Run to completion and return stdout followed by stderr.
    ///
    /// A spawn failure or a non-zero exit is a `CraneError::Process` carrying
    /// whatever the process printed.
    fn captured(&self, args: &[String]) -> Result<Vec<u8>>;

    /// Start the process attached to the invoking terminal and return without
    /// waiting for it
    fn streaming(&self, args: &[String]) -> Result<StreamingSession>;

    /// Pipe the runtime's output through `filters` (plain host commands),
    /// blocking only on the last one
    fn pipeline(&self, args: &[String], filters: &[Vec<String>]) -> Result<String>;
}

/// A process started in streaming mode
#[derive(Debug)]
pub struct StreamingSession {
    argv: Vec<String>,
    child: Option<Child>,
}

impl StreamingSession {
    /// Session with no process behind it, for executors that do not spawn
    pub fn detached(argv: Vec<String>) -> Self {
        Self { argv, child: None }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Block until the process exits; a non-zero exit is an error
    pub fn wait(mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| CraneError::process(&self.argv, b"", e))?;
        if !status.success() {
            return Err(CraneError::process(&self.argv, b"", status));
        }
        Ok(())
    }
}

/// Executor spawning `<elevate> <runtime> <args>` in the work directory
#[derive(Debug, Clone)]
pub struct ElevatedExecutor {
    elevate: String,
    runtime: String,
    work_dir: PathBuf,
}

impl ElevatedExecutor {
    pub fn new(elevate: impl Into<String>, runtime: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            elevate: elevate.into(),
            runtime: runtime.into(),
            work_dir: work_dir.into(),
        }
    }

    /// Full command line for a runtime invocation
    pub fn argv(&self, args: &[String]) -> Vec<String> {
        let mut argv = Vec::with_capacity(args.len() + 2);
        argv.push(self.elevate.clone());
        argv.push(self.runtime.clone());
        argv.extend(args.iter().cloned());
        argv
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.elevate);
        command
            .arg(&self.runtime)
            .args(args)
            .current_dir(&self.work_dir);
        command
    }
}

impl ProcessExecutor for ElevatedExecutor {
    fn captured(&self, args: &[String]) -> Result<Vec<u8>> {
        let argv = self.argv(args);
        debug!(command = ?argv, "running captured");

        let output = self
            .command(args)
            .output()
            .map_err(|e| CraneError::process(&argv, b"", e))?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        if !output.status.success() {
            return Err(CraneError::process(&argv, &combined, output.status));
        }
        Ok(combined)
    }

    fn streaming(&self, args: &[String]) -> Result<StreamingSession> {
        let argv = self.argv(args);
        debug!(command = ?argv, "running attached to the terminal");

        // The child gets the terminal itself, so `-t` sees a real TTY.
        let child = self
            .command(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| CraneError::process(&argv, b"", e))?;

        Ok(StreamingSession {
            argv,
            child: Some(child),
        })
    }

    fn pipeline(&self, args: &[String], filters: &[Vec<String>]) -> Result<String> {
        let argv = self.argv(args);
        debug!(command = ?argv, filters = ?filters, "running pipeline");

        let Some((last, middle)) = filters.split_last() else {
            let output = self.captured(args)?;
            return Ok(String::from_utf8_lossy(&output).into_owned());
        };

        let mut producer = self
            .command(args)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| CraneError::process(&argv, b"", e))?;
        let mut upstream = producer.stdout.take();
        let mut started = vec![producer];

        for stage in middle {
            let spawned = host_command(stage).and_then(|mut command| {
                command
                    .stdin(upstream.take().map(Stdio::from).unwrap_or_else(Stdio::null))
                    .stdout(Stdio::piped())
                    .spawn()
                    .map_err(|e| CraneError::process(stage, b"", e))
            });
            match spawned {
                Ok(mut child) => {
                    upstream = child.stdout.take();
                    started.push(child);
                }
                Err(e) => {
                    reap(started);
                    return Err(e);
                }
            }
        }

        let finished = host_command(last).and_then(|mut command| {
            command
                .stdin(upstream.take().map(Stdio::from).unwrap_or_else(Stdio::null))
                .output()
                .map_err(|e| CraneError::process(last, b"", e))
        });
        reap(started);
        let output = finished?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        if !output.status.success() {
            return Err(CraneError::process(last, &combined, output.status));
        }
        Ok(String::from_utf8_lossy(&combined).into_owned())
    }
}

/// Wait for upstream stages; their exit codes are not inspected
fn reap(children: Vec<Child>) {
    for mut child in children {
        if let Err(e) = child.wait() {
            debug!(error = %e, "failed to reap pipeline stage");
        }
    }
}

fn host_command(stage: &[String]) -> Result<Command> {
    let (program, args) = stage
        .split_first()
        .ok_or_else(|| CraneError::InvalidArguments("empty pipeline stage".to_string()))?;
    let mut command = Command::new(program);
    command.args(args);
    Ok(command)
}
