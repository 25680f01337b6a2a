//! Error types for interpreter invocation and introspection.
//!
//! [`InvocationError`] covers launching the interpreter and waiting for it.
//! [`IntrospectionError`] adds the failures of the listing and description
//! operations themselves. Malformed rows never surface here: the parsers
//! drop or default them and keep going.

use thiserror::Error;

/// The interpreter could not be run to completion.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// Interpreter binary is not installed or not on `PATH`.
    #[error("interpreter not found: {program}")]
    NotFound { program: String },

    /// Spawning failed for another reason (permissions, resource limits).
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Interpreter exited unsuccessfully.
    #[error("{program} exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Interpreter did not finish within the configured timeout.
    #[error("{program} timed out after {timeout_ms} ms")]
    TimedOut { program: String, timeout_ms: u64 },

    /// Request was cancelled by the caller.
    #[error("{program} invocation cancelled")]
    Cancelled { program: String },

    /// Waiting on or reading from the child process failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// An introspection operation failed.
#[derive(Debug, Error)]
pub enum IntrospectionError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// Parameter-set description produced no rows.
    #[error("no parameter metadata reported for command: {command}")]
    EmptyOutput { command: String },

    /// Name cannot be safely placed into a query.
    #[error("invalid {kind} name: {name:?}")]
    InvalidName { kind: &'static str, name: String },
}

/// Convenience alias for results with [`IntrospectionError`].
pub type Result<T> = std::result::Result<T, IntrospectionError>;

/// Loading or saving interpreter configuration failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
