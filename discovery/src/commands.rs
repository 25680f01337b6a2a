//! Command listing with legacy-interpreter fallback.
//!
//! Two incompatible interpreter binaries can live on the same host and a
//! module may only be registered with one of them. When the primary
//! interpreter lists nothing for a module, the same query is retried once
//! against the legacy interpreter. Invocation failures are never retried.

use psform_core::Command;
use tracing::{debug, info};

use crate::error::Result;
use crate::query;
use crate::runner::{CancelToken, CommandRunner};
use crate::tokenizer::{TABLE_HEADER_ROWS, logical_rows, tabular_fields};

/// Parses command table output into command records, in output order.
///
/// # Examples
///
/// ```
/// use psform_discovery::commands::parse_commands;
///
/// let raw = "\nName\n----\nGet-Foo\nSet-Foo\n";
/// let names: Vec<String> = parse_commands(raw).into_iter().map(|c| c.name).collect();
/// assert_eq!(names, ["Get-Foo", "Set-Foo"]);
/// ```
pub fn parse_commands(raw: &str) -> Vec<Command> {
    logical_rows(raw, TABLE_HEADER_ROWS)
        .iter()
        .filter_map(|row| tabular_fields(row).first().map(|name| Command::new(*name)))
        .collect()
}

/// Lists the exported commands of `module`.
///
/// # Errors
///
/// [`IntrospectionError::InvalidName`](crate::IntrospectionError::InvalidName)
/// for unsafe module names, or the first invocation failure encountered.
pub fn list_commands(
    primary: &dyn CommandRunner,
    legacy: Option<&dyn CommandRunner>,
    module: &str,
    cancel: &CancelToken,
) -> Result<Vec<Command>> {
    let query = query::list_commands(module)?;

    let commands = parse_commands(&primary.run(&query, cancel)?);
    if !commands.is_empty() {
        return Ok(commands);
    }

    let Some(legacy) = legacy else {
        debug!(module, interpreter = primary.label(), "No commands listed");
        return Ok(Vec::new());
    };

    info!(
        module,
        primary = primary.label(),
        legacy = legacy.label(),
        "Primary interpreter listed no commands, retrying with legacy interpreter"
    );
    Ok(parse_commands(&legacy.run(&query, cancel)?))
}
