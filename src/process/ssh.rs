//! Remote shell sessions into daemonized containers

use std::process::Command;

use tracing::debug;

use crate::error::{CraneError, Result};

const SSH: &str = "ssh";
const SSHPASS: &str = "sshpass";
const SSH_PORT: &str = "22";

/// Opens an authenticated terminal session and runs one command
pub trait RemoteShell {
    fn run(&self, address: &str, username: &str, password: &str, command: &str) -> Result<()>;
}

/// `RemoteShell` backed by the system `ssh` client.
///
/// The password is handed to `sshpass` through its environment, never on the
/// command line.
#[derive(Debug, Clone, Default)]
pub struct SshShell;

impl RemoteShell for SshShell {
    fn run(&self, address: &str, username: &str, password: &str, command: &str) -> Result<()> {
        let ssh_args = ssh_arguments(address, username, command);

        let mut process = if password.is_empty() {
            Command::new(SSH)
        } else {
            let mut process = Command::new(SSHPASS);
            process.arg("-e").arg(SSH).env("SSHPASS", password);
            process
        };
        process.args(&ssh_args);

        let mut argv = vec![SSH.to_string()];
        argv.extend(ssh_args);
        debug!(address, username, command, "opening remote shell session");

        let status = process
            .status()
            .map_err(|e| CraneError::process(&argv, b"", e))?;
        if !status.success() {
            return Err(CraneError::process(&argv, b"", status));
        }
        Ok(())
    }
}

/// Arguments for `ssh`: forced TTY, port 22, no host key prompts
pub fn ssh_arguments(address: &str, username: &str, command: &str) -> Vec<String> {
    let target = if username.is_empty() {
        address.to_string()
    } else {
        format!("{}@{}", username, address)
    };
    vec![
        "-tt".to_string(),
        "-p".to_string(),
        SSH_PORT.to_string(),
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-o".to_string(),
        "UserKnownHostsFile=/dev/null".to_string(),
        target,
        command.to_string(),
    ]
}
