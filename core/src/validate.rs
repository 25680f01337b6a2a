//! Submission validation.
//!
//! Checks submitted [`FieldValues`] against a [`Form`] before the command
//! line is assembled. Assembly itself never fails; consumers that want to
//! refuse incomplete submissions call [`validate_submission`] first.
//!
//! # Examples
//!
//! ```
//! use psform_core::*;
//!
//! let set = ParameterSet::new("Name").with_required(Parameter::new("Name", "String[]"));
//! let form = Form::new("Get-Process", &set);
//!
//! let errors = validate_submission(&form, &FieldValues::new());
//! assert_eq!(errors, vec![SubmissionError::MissingValue("Name".into())]);
//! ```

use thiserror::Error;

use crate::assemble::{FieldValue, FieldValues};
use crate::form::{Form, WidgetKind};

/// Problems found in a form submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Required text or choice field left empty.
    #[error("a value is required for -{0}")]
    MissingValue(String),
    /// Choice value outside the enumerated set.
    #[error("'{value}' is not an allowed value for -{name}")]
    ValueNotAllowed { name: String, value: String },
    /// Value submitted for a parameter the form does not have.
    #[error("unknown parameter -{0}")]
    UnknownParameter(String),
    /// Text other than `true`/`false` submitted for a toggle field.
    #[error("-{0} is a switch and takes no value")]
    NotAToggle(String),
    /// Toggle submitted for a text or choice field.
    #[error("-{0} expects a value, not a switch state")]
    NotText(String),
}

/// Validates `values` against `form`, returning every problem found.
///
/// Errors for form fields come first, in form order, followed by unknown
/// names in name order.
pub fn validate_submission(form: &Form, values: &FieldValues) -> Vec<SubmissionError> {
    let mut errors = Vec::new();

    for field in &form.fields {
        let name = &field.parameter_name;
        match (&field.widget, values.get(name)) {
            (WidgetKind::BooleanToggle, Some(value)) if value.as_toggle().is_none() => {
                errors.push(SubmissionError::NotAToggle(name.clone()));
            }
            (WidgetKind::BooleanToggle, _) => {}
            (_, Some(FieldValue::Toggle(_))) => {
                errors.push(SubmissionError::NotText(name.clone()));
            }
            (_, value) if value.is_none_or(FieldValue::is_blank) => {
                if field.requires_value() {
                    errors.push(SubmissionError::MissingValue(name.clone()));
                }
            }
            (WidgetKind::EnumeratedChoice { values: allowed, .. }, Some(FieldValue::Text(text))) => {
                if !allowed.iter().any(|v| v == text) {
                    errors.push(SubmissionError::ValueNotAllowed {
                        name: name.clone(),
                        value: text.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    for (name, _) in values.iter() {
        if form.field(name).is_none() {
            errors.push(SubmissionError::UnknownParameter(name.to_string()));
        }
    }

    errors
}
