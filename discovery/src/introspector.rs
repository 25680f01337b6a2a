//! The introspection facade consumed by display and form layers.
//!
//! [`Introspector`] bundles a primary and an optional legacy
//! [`CommandRunner`] and exposes the three listing operations. Each call is
//! independent: nothing is cached here and overlapping calls for the same
//! name simply run the query twice. Every operation has a `_with_cancel`
//! variant taking a [`CancelToken`] for the request.

use psform_core::{Command, CommandDetails, Module};
use tracing::debug;

use crate::commands;
use crate::config::InterpreterConfig;
use crate::error::Result;
use crate::modules::parse_modules;
use crate::parameters::describe_command;
use crate::query;
use crate::runner::{CancelToken, CommandRunner, ProcessRunner};

/// Entry point for module, command and parameter-set introspection.
///
/// # Examples
///
/// ```
/// use psform_discovery::Introspector;
/// use psform_discovery::runner::ScriptedRunner;
///
/// let runner = ScriptedRunner::new("pwsh")
///     .respond("Name Version ModuleBase\n---- ------- ----------\nPester 5.5.0 /m/Pester\n");
/// let introspector = Introspector::new(Box::new(runner));
///
/// let modules = introspector.list_modules().unwrap();
/// assert_eq!(modules[0].name, "Pester");
/// ```
pub struct Introspector {
    primary: Box<dyn CommandRunner>,
    legacy: Option<Box<dyn CommandRunner>>,
}

impl Introspector {
    pub fn new(primary: Box<dyn CommandRunner>) -> Self {
        Self {
            primary,
            legacy: None,
        }
    }

    /// Adds the interpreter tried when the primary lists no commands.
    pub fn with_legacy(mut self, legacy: Box<dyn CommandRunner>) -> Self {
        self.legacy = Some(legacy);
        self
    }

    /// Builds process-backed runners from configuration.
    pub fn from_config(config: &InterpreterConfig) -> Self {
        let timeout = config.timeout();
        let introspector = Self::new(Box::new(ProcessRunner::from_spec(&config.primary, timeout)));
        match &config.legacy {
            Some(legacy) => {
                introspector.with_legacy(Box::new(ProcessRunner::from_spec(legacy, timeout)))
            }
            None => introspector,
        }
    }

    /// Installed modules, newest version per name.
    ///
    /// Empty interpreter output is an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Invocation failures of the primary interpreter.
    pub fn list_modules(&self) -> Result<Vec<Module>> {
        self.list_modules_with_cancel(&CancelToken::new())
    }

    pub fn list_modules_with_cancel(&self, cancel: &CancelToken) -> Result<Vec<Module>> {
        let raw = self.primary.run(query::LIST_MODULES, cancel)?;
        let modules = parse_modules(&raw);
        debug!(interpreter = self.primary.label(), count = modules.len(), "Listed modules");
        Ok(modules)
    }

    /// Exported commands of `module`, retrying the legacy interpreter once
    /// when the primary lists none.
    ///
    /// # Errors
    ///
    /// Unsafe module names and invocation failures.
    pub fn list_commands(&self, module: &str) -> Result<Vec<Command>> {
        self.list_commands_with_cancel(module, &CancelToken::new())
    }

    pub fn list_commands_with_cancel(
        &self,
        module: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<Command>> {
        commands::list_commands(
            self.primary.as_ref(),
            self.legacy.as_deref(),
            module,
            cancel,
        )
    }

    /// Parameter sets of `command` and the designated default set.
    ///
    /// # Errors
    ///
    /// Unsafe command names, invocation failures, and
    /// [`IntrospectionError::EmptyOutput`](crate::IntrospectionError::EmptyOutput)
    /// when no parameter set is reported.
    pub fn get_command_details(&self, command: &str) -> Result<CommandDetails> {
        self.get_command_details_with_cancel(command, &CancelToken::new())
    }

    pub fn get_command_details_with_cancel(
        &self,
        command: &str,
        cancel: &CancelToken,
    ) -> Result<CommandDetails> {
        describe_command(self.primary.as_ref(), command, cancel)
    }
}
