//! Probe failure taxonomy. Every variant is recoverable: the affected field
//! falls back to its default and the tick continues.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProbeError {
    /// Source file or command is missing, unreadable or empty.
    #[error("{target} unavailable")]
    Unavailable { target: String },

    /// Source exists but its content has an unexpected shape.
    #[error("could not parse {target}: {detail}")]
    Parse { target: String, detail: String },

    /// External command failed to spawn or exited non-zero.
    #[error("command `{command}` failed: {detail}")]
    Command { command: String, detail: String },

    /// Process disappeared (or denied access) between listing and inspection.
    #[error("process {pid} vanished")]
    Vanished { pid: u32 },
}

pub type ProbeResult<T> = Result<T, ProbeError>;

impl ProbeError {
    pub fn unavailable(target: impl Into<String>) -> Self {
        ProbeError::Unavailable {
            target: target.into(),
        }
    }

    pub fn parse(target: impl Into<String>, detail: impl Into<String>) -> Self {
        ProbeError::Parse {
            target: target.into(),
            detail: detail.into(),
        }
    }
}
