//! Recording fakes for the process seams, used by unit tests

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::context::Context;
use crate::error::{CraneError, Result};
use crate::process::{ProcessExecutor, RemoteShell, StreamingSession};

const ID_FILE_OPTION: &str = "--cidfile=";

enum Reply {
    Output(String),
    Failure(String),
}

/// `ProcessExecutor` that records every invocation instead of spawning it.
///
/// Replies are queued per verb (the first argument); a verb without a queued
/// reply succeeds with empty output. When built with `writing_ids_to`, any
/// invocation asking for an id file gets one written, the way the runtime
/// would.
#[derive(Default)]
pub struct FakeExecutor {
    calls: RefCell<Vec<Vec<String>>>,
    replies: RefCell<HashMap<String, VecDeque<Reply>>>,
    id_dir: Option<PathBuf>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writing_ids_to(dir: &Path) -> Self {
        Self {
            id_dir: Some(dir.to_path_buf()),
            ..Self::default()
        }
    }

    pub fn reply(&self, verb: &str, output: &str) -> &Self {
        self.queue(verb, Reply::Output(output.to_string()));
        self
    }

    pub fn fail(&self, verb: &str, output: &str) -> &Self {
        self.queue(verb, Reply::Failure(output.to_string()));
        self
    }

    /// Every invocation so far, without the elevation prefix
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn verbs(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| call.first().cloned())
            .collect()
    }

    fn queue(&self, verb: &str, reply: Reply) {
        self.replies
            .borrow_mut()
            .entry(verb.to_string())
            .or_default()
            .push_back(reply);
    }

    fn answer(&self, args: &[String]) -> Result<String> {
        self.calls.borrow_mut().push(args.to_vec());

        if let Some(dir) = &self.id_dir {
            for arg in args {
                if let Some(file_name) = arg.strip_prefix(ID_FILE_OPTION) {
                    let container = file_name.trim_start_matches(".cidfile");
                    fs::write(dir.join(file_name), format!("id-{}\n", container))?;
                }
            }
        }

        let verb = args.first().cloned().unwrap_or_default();
        let reply = self
            .replies
            .borrow_mut()
            .get_mut(&verb)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::Failure(output)) => Err(CraneError::process(args, output.as_bytes(), "exit status: 1")),
            None => Ok(String::new()),
        }
    }
}

impl ProcessExecutor for FakeExecutor {
    fn captured(&self, args: &[String]) -> Result<Vec<u8>> {
        Ok(self.answer(args)?.into_bytes())
    }

    fn streaming(&self, args: &[String]) -> Result<StreamingSession> {
        self.answer(args)?;
        Ok(StreamingSession::detached(args.to_vec()))
    }

    fn pipeline(&self, args: &[String], _filters: &[Vec<String>]) -> Result<String> {
        self.answer(args)
    }
}

/// One remote shell session opened by `FakeShell`
#[derive(Debug, Clone, PartialEq)]
pub struct ShellCall {
    pub address: String,
    pub username: String,
    pub password: String,
    pub command: String,
}

#[derive(Default)]
pub struct FakeShell {
    calls: RefCell<Vec<ShellCall>>,
}

impl FakeShell {
    pub fn calls(&self) -> Vec<ShellCall> {
        self.calls.borrow().clone()
    }
}

impl RemoteShell for FakeShell {
    fn run(&self, address: &str, username: &str, password: &str, command: &str) -> Result<()> {
        self.calls.borrow_mut().push(ShellCall {
            address: address.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            command: command.to_string(),
        });
        Ok(())
    }
}

/// Context over `dir` with the given Cranefile and no settle delay
pub fn context<'a>(
    dir: &Path,
    cranefile: &str,
    executor: &'a FakeExecutor,
    shell: &'a FakeShell,
) -> Context<'a> {
    let config = Config::parse(cranefile).unwrap();
    let mut context = Context::new(config, dir, executor, shell);
    context.settle_delay = std::time::Duration::ZERO;
    context.store.ensure_exists().unwrap();
    context
}

pub fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}
