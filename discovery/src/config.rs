//! Interpreter configuration.
//!
//! Says which interpreter binaries to launch and, optionally, how long to
//! wait for them. Loaded from YAML; every field has a default so an empty
//! document is a valid configuration. Invocations wait indefinitely unless
//! `timeout_ms` is set.
//!
//! # Example YAML
//!
//! ```yaml
//! primary:
//!   program: pwsh
//!   args: ["-NoProfile", "-NonInteractive", "-Command"]
//! legacy:
//!   program: powershell
//!   args: ["-NoProfile", "-NonInteractive", "-Command"]
//! timeout_ms: 30000
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_ARGS: &[&str] = &["-NoProfile", "-NonInteractive", "-Command"];

/// How to launch one interpreter binary.
///
/// The query is appended after `args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterSpec {
    pub program: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

impl InterpreterSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: default_args(),
        }
    }

    /// Cross-platform PowerShell (`pwsh`).
    pub fn pwsh() -> Self {
        Self::new("pwsh")
    }

    /// Windows PowerShell (`powershell`).
    pub fn windows_powershell() -> Self {
        Self::new("powershell")
    }
}

fn default_args() -> Vec<String> {
    DEFAULT_ARGS.iter().map(|a| a.to_string()).collect()
}

fn default_primary() -> InterpreterSpec {
    InterpreterSpec::pwsh()
}

fn default_legacy() -> Option<InterpreterSpec> {
    cfg!(windows).then(InterpreterSpec::windows_powershell)
}

/// Top-level interpreter configuration.
///
/// # Examples
///
/// ```
/// use psform_discovery::config::InterpreterConfig;
///
/// let config: InterpreterConfig = serde_yaml::from_str("primary:\n  program: /opt/pwsh\n").unwrap();
/// assert_eq!(config.primary.program, "/opt/pwsh");
/// assert_eq!(config.primary.args, ["-NoProfile", "-NonInteractive", "-Command"]);
/// assert_eq!(config.timeout_ms, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Interpreter queried first.
    #[serde(default = "default_primary")]
    pub primary: InterpreterSpec,
    /// Interpreter retried when the primary lists no commands for a module.
    #[serde(default = "default_legacy")]
    pub legacy: Option<InterpreterSpec>,
    /// Per-invocation timeout; `None` waits indefinitely.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            legacy: default_legacy(),
            timeout_ms: None,
        }
    }
}

impl InterpreterConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be written, or
    /// [`ConfigError::Yaml`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("psform.yaml");

        let config = InterpreterConfig {
            primary: InterpreterSpec::new("/usr/local/bin/pwsh"),
            legacy: Some(InterpreterSpec {
                program: "powershell.exe".to_string(),
                args: vec!["-Command".to_string()],
            }),
            timeout_ms: None,
        };
        config.save(&path).unwrap();

        let loaded = InterpreterConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.timeout(), None);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: InterpreterConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, InterpreterConfig::default());
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_absent_timeout_waits_indefinitely() {
        let config: InterpreterConfig = serde_yaml::from_str("primary:\n  program: pwsh\n").unwrap();
        assert_eq!(config.timeout_ms, None);
        assert_eq!(InterpreterConfig::default().timeout(), None);
    }

    #[test]
    fn test_explicit_timeout_is_opt_in() {
        let config: InterpreterConfig = serde_yaml::from_str("timeout_ms: 1500\n").unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_explicit_null_legacy_disables_fallback() {
        let config: InterpreterConfig = serde_yaml::from_str("legacy: null\n").unwrap();
        assert!(config.legacy.is_none());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = InterpreterConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
