//! Error types for Crane

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CraneError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to decode configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("State error: {0}")]
    State(String),

    #[error("Command `{command}` failed:{}", external_message(.output, .host))]
    Process {
        command: String,
        output: String,
        host: String,
    },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CraneError {
    /// Build a process error from the captured output of the failed command
    pub fn process(command: &[String], output: &[u8], host: impl ToString) -> Self {
        CraneError::Process {
            command: command.join(" "),
            output: String::from_utf8_lossy(output).trim().to_string(),
            host: host.to_string(),
        }
    }
}

/// Combine the external process's own diagnostics with the host-level error
pub fn external_message(output: &str, host: &str) -> String {
    let mut message = String::new();
    if !output.is_empty() {
        message.push_str(&format!("\nContainer's message:\n{}", output));
    }
    if !host.is_empty() {
        message.push_str(&format!("\nHost Error:\n{}", host));
    }
    message
}

pub type Result<T> = std::result::Result<T, CraneError>;
