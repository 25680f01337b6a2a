//! Parameter-set description parsing.
//!
//! Each output row describes one parameter set:
//!
//! ```text
//! ByName|Name,String[], |Force,SwitchParameter, Scope,String,User;Machine
//! ```
//!
//! Parsing is lenient. A row without three `|` sections still yields its
//! set, with no parameters. A parameter token with an empty name is dropped.
//! Missing type or values subfields default to empty. One bad row never
//! stops the rows after it.

use psform_core::{CommandDetails, Parameter, ParameterSet, ParameterSets, is_default_set_name};
use tracing::debug;

use crate::error::{IntrospectionError, Result};
use crate::query;
use crate::runner::{CancelToken, CommandRunner};
use crate::tokenizer::{logical_rows, parameter_tokens, split_metadata_row, split_parameter_token};

/// Parses one required/optional blob into parameters.
pub fn parse_parameter_blob(blob: &str) -> Vec<Parameter> {
    parameter_tokens(blob)
        .filter_map(|token| {
            let token = split_parameter_token(token);
            if token.name.is_empty() {
                debug!("Dropping parameter token without a name");
                return None;
            }
            Some(Parameter::new(token.name, token.type_name).with_values(token.values))
        })
        .collect()
}

/// Parses one metadata row. `None` when the row has no set name.
pub fn parse_parameter_set_row(row: &str) -> Option<ParameterSet> {
    let (set_name, sections) = split_metadata_row(row);
    if set_name.is_empty() {
        debug!(row, "Dropping parameter set row without a set name");
        return None;
    }
    let mut set = ParameterSet::new(set_name);
    match sections {
        Some(sections) => {
            set.required_parameters = parse_parameter_blob(sections.required);
            set.optional_parameters = parse_parameter_blob(sections.optional);
        }
        None => debug!(set = set_name, "Malformed parameter set row, keeping set without parameters"),
    }
    Some(set)
}

/// Parses the full description output of one command.
///
/// Never fails; output without rows gives empty details.
///
/// # Examples
///
/// ```
/// use psform_discovery::parameters::parse_command_details;
///
/// let raw = "\
/// Name|Name,String[], |Force,SwitchParameter,
/// Id|Id,Int32[], |Force,SwitchParameter,
/// ";
/// let details = parse_command_details(raw);
/// assert_eq!(details.parameter_sets.len(), 2);
/// assert_eq!(details.default_parameter_set, None);
/// assert_eq!(details.display_set_name(), Some("Id"));
/// ```
pub fn parse_command_details(raw: &str) -> CommandDetails {
    let mut parameter_sets = ParameterSets::default();
    let mut default_parameter_set = None;

    for row in logical_rows(raw, 0) {
        let Some(set) = parse_parameter_set_row(&row) else {
            continue;
        };
        if is_default_set_name(&set.set_name) {
            default_parameter_set = Some(set.set_name.clone());
        }
        parameter_sets.insert(set);
    }

    CommandDetails {
        parameter_sets,
        default_parameter_set,
    }
}

/// Describes the parameter sets of `command`.
///
/// # Errors
///
/// [`IntrospectionError::InvalidName`] for unsafe command names,
/// any invocation failure, and [`IntrospectionError::EmptyOutput`] when the
/// interpreter reports no parameter set at all.
pub fn describe_command(
    runner: &dyn CommandRunner,
    command: &str,
    cancel: &CancelToken,
) -> Result<CommandDetails> {
    let query = query::describe_parameter_sets(command)?;
    let details = parse_command_details(&runner.run(&query, cancel)?);
    if details.parameter_sets.is_empty() {
        return Err(IntrospectionError::EmptyOutput {
            command: command.to_string(),
        });
    }
    debug!(
        command,
        sets = details.parameter_sets.len(),
        default = details.default_parameter_set.as_deref(),
        "Parsed parameter sets"
    );
    Ok(details)
}
