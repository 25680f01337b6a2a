//! Command-line assembly from submitted form values.
//!
//! [`assemble_command`] walks the fields in form order and appends
//! `" -<name> <value>"` for every field that carries a value. Toggles that
//! are switched on contribute only `-<name>`. The literal texts `true` and
//! `false` become `$true` / `$false`, and values containing whitespace are
//! double-quoted. Output is byte-identical for identical inputs.
//!
//! # Examples
//!
//! ```
//! use psform_core::*;
//!
//! let set = ParameterSet::new("Name")
//!     .with_required(Parameter::new("Name", "String[]"))
//!     .with_optional(Parameter::new("Force", "SwitchParameter"));
//! let form = Form::new("Get-Process", &set);
//!
//! let mut values = FieldValues::new();
//! values.set_text("Name", "notepad");
//!
//! assert_eq!(assemble_command(&form.command, &form.fields, &values), "Get-Process -Name notepad");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::form::{FormField, WidgetKind};

/// A value entered for one field.
///
/// Deserializes from a JSON boolean (toggle), string (text) or number
/// (text holding the number's JSON rendering).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "SubmittedValue")]
pub enum FieldValue {
    Toggle(bool),
    Text(String),
}

/// Wire shapes accepted for a [`FieldValue`].
#[derive(Deserialize)]
#[serde(untagged)]
enum SubmittedValue {
    Toggle(bool),
    Number(serde_json::Number),
    Text(String),
}

impl From<SubmittedValue> for FieldValue {
    fn from(value: SubmittedValue) -> Self {
        match value {
            SubmittedValue::Toggle(on) => Self::Toggle(on),
            SubmittedValue::Number(n) => Self::Text(n.to_string()),
            SubmittedValue::Text(text) => Self::Text(text),
        }
    }
}

impl FieldValue {
    pub fn is_on(&self) -> bool {
        matches!(self, Self::Toggle(true))
    }

    /// Switch state: toggles as-is, and the texts `true`/`false` (any case).
    /// `None` for any other text.
    pub fn as_toggle(&self) -> Option<bool> {
        match self {
            Self::Toggle(on) => Some(*on),
            Self::Text(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
        }
    }

    /// Text content, `None` for toggles.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Toggle(_) => None,
        }
    }

    /// Whether a text value was actually entered.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Toggle(_) => false,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Toggle(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Submitted values keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues {
    values: BTreeMap<String, FieldValue>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object such as `{"Name": "notepad", "Force": true}`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Starts from the initial values of `fields`.
    pub fn initial(fields: &[FormField]) -> Self {
        let values = fields
            .iter()
            .filter_map(|f| f.initial.clone().map(|v| (f.parameter_name.clone(), v)))
            .collect();
        Self { values }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn set_text(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.set(name, FieldValue::Text(text.into()));
    }

    pub fn set_toggle(&mut self, name: impl Into<String>, on: bool) {
        self.set(name, FieldValue::Toggle(on));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.values.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let values = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { values }
    }
}

/// Serializes submitted values into a single invocation string.
///
/// Values for names that are not among `fields` are ignored.
pub fn assemble_command(command: &str, fields: &[FormField], values: &FieldValues) -> String {
    let mut line = command.to_string();
    for field in fields {
        let Some(value) = values.get(&field.parameter_name) else {
            continue;
        };
        if let Some(argument) = render_argument(&field.widget, value) {
            line.push_str(" -");
            line.push_str(&field.parameter_name);
            if let Some(argument) = argument {
                line.push(' ');
                line.push_str(&argument);
            }
        }
    }
    line
}

/// `None`: field is skipped. `Some(None)`: flag only. `Some(Some(v))`: flag and value.
fn render_argument(widget: &WidgetKind, value: &FieldValue) -> Option<Option<String>> {
    match (widget, value) {
        // Other text on a switch is dropped; validate_submission reports it.
        (WidgetKind::BooleanToggle, value) => value.as_toggle().unwrap_or(false).then_some(None),
        (_, FieldValue::Toggle(true)) => Some(None),
        (_, FieldValue::Toggle(false)) => None,
        (_, FieldValue::Text(text)) if text.trim().is_empty() => None,
        (_, FieldValue::Text(text)) => Some(Some(format_value(text))),
    }
}

/// Applies the boolean-literal rewrite and whitespace quoting to one value.
///
/// # Examples
///
/// ```
/// use psform_core::format_value;
///
/// assert_eq!(format_value("notepad"), "notepad");
/// assert_eq!(format_value("hello world"), "\"hello world\"");
/// assert_eq!(format_value("true"), "$true");
/// ```
pub fn format_value(text: &str) -> String {
    match text {
        "true" => return "$true".to_string(),
        "false" => return "$false".to_string(),
        _ => {}
    }
    if text.chars().any(char::is_whitespace) {
        format!("\"{}\"", text.replace('"', "`\""))
    } else {
        text.to_string()
    }
}
