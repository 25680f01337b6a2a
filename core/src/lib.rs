//! Core types, form synthesis and command assembly for PowerShell command
//! introspection.
//!
//! This crate is pure: it never launches a process. It defines:
//!
//! - [`Module`], [`Command`], [`Parameter`], [`ParameterSet`],
//!   [`ParameterSets`] and [`CommandDetails`] — the structured model built
//!   from interpreter output by `psform-discovery`.
//! - [`synthesize_form`] / [`Form`] — derives ordered [`FormField`]s for one
//!   parameter set, with a closed [`WidgetKind`] per field.
//! - [`assemble_command`] — serializes submitted [`FieldValues`] back into
//!   a command line.
//! - [`validate_submission`] — optional pre-submit checks.
//!
//! # Example
//!
//! ```
//! use psform_core::*;
//!
//! let set = ParameterSet::new("Path")
//!     .with_required(Parameter::new("Path", "String[]"))
//!     .with_optional(Parameter::new("Recurse", "SwitchParameter"));
//! let form = Form::new("Get-ChildItem", &set);
//!
//! let mut values = FieldValues::new();
//! values.set_text("Path", "C:\\Program Files");
//! values.set_toggle("Recurse", true);
//!
//! assert!(validate_submission(&form, &values).is_empty());
//! assert_eq!(
//!     assemble_command(&form.command, &form.fields, &values),
//!     "Get-ChildItem -Path \"C:\\Program Files\" -Recurse"
//! );
//! ```

mod assemble;
mod form;
mod types;
mod validate;

pub use assemble::{FieldValue, FieldValues, assemble_command, format_value};
pub use form::{
    COMMON_PARAMETERS, ChoiceOption, FieldGroup, Form, FormField, WidgetKind, is_common_parameter,
    synthesize_form,
};
pub use types::*;
pub use validate::{SubmissionError, validate_submission};
