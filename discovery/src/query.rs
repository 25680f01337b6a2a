//! Query templates sent to the interpreter.
//!
//! Module and command names are interpolated into PowerShell source, so they
//! are checked against a conservative pattern first. Names outside it are
//! rejected before any process is launched.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{IntrospectionError, Result};

static SAFE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("static regex must compile"));

/// Newest installed version of every module, one row per name.
pub const LIST_MODULES: &str = "Get-Module -ListAvailable \
    | Group-Object Name \
    | ForEach-Object { $_.Group | Sort-Object Version -Descending | Select-Object -First 1 } \
    | Select-Object Name, Version, ModuleBase";

/// Exported commands of `module`, sorted by name.
///
/// # Errors
///
/// [`IntrospectionError::InvalidName`] if `module` is not a plain name.
///
/// # Examples
///
/// ```
/// use psform_discovery::query::list_commands;
///
/// let query = list_commands("Microsoft.PowerShell.Utility").unwrap();
/// assert!(query.starts_with("Get-Command -Module Microsoft.PowerShell.Utility"));
/// assert!(list_commands("x; Remove-Item *").is_err());
/// ```
pub fn list_commands(module: &str) -> Result<String> {
    let module = checked_name("module", module)?;
    Ok(format!(
        "Get-Command -Module {module} | Select-Object Name | Sort-Object Name"
    ))
}

/// One `set|required|optional` line per parameter set of `command`.
///
/// Each parameter is rendered as `name,type,values` with enumerated values
/// joined by `;`; parameters within a section are separated by spaces.
///
/// # Errors
///
/// [`IntrospectionError::InvalidName`] if `command` is not a plain name.
pub fn describe_parameter_sets(command: &str) -> Result<String> {
    let command = checked_name("command", command)?;
    let param = "$_.Name + ',' + $_.ParameterType.Name + ',' + \
        (($_.Attributes | ? { $_ -is [System.Management.Automation.ValidateSetAttribute] }).ValidValues -join ';')";
    Ok(format!(
        "(Get-Command {command}).ParameterSets | % {{ $_.Name + '|' + \
         ($_.Parameters | ? {{ $_.IsMandatory }} | % {{ {param} }}) + '|' + \
         ($_.Parameters | ? {{ !$_.IsMandatory }} | % {{ {param} }}) }}"
    ))
}

fn checked_name<'a>(kind: &'static str, name: &'a str) -> Result<&'a str> {
    let trimmed = name.trim();
    if SAFE_NAME_RE.is_match(trimmed) {
        Ok(trimmed)
    } else {
        Err(IntrospectionError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}
