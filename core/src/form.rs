//! Form synthesis from a parameter set.
//!
//! [`synthesize_form`] turns one [`ParameterSet`] into an ordered list of
//! [`FormField`]s. The order is fully determined by the input: required
//! parameters first, then optional ones, each group sorted by name with an
//! ordinal compare. Every field is tagged with a [`FieldGroup`] so renderers
//! can put the interpreter's standard parameters in their own area, and with
//! a [`WidgetKind`] computed once here so consumers never re-inspect type
//! names.
//!
//! # Examples
//!
//! ```
//! use psform_core::*;
//!
//! let set = ParameterSet::new("Name")
//!     .with_required(Parameter::new("Name", "String[]"))
//!     .with_optional(Parameter::new("Verbose", "SwitchParameter"))
//!     .with_optional(Parameter::new("Force", "SwitchParameter"));
//!
//! let form = Form::new("Stop-Process", &set);
//! let names: Vec<&str> = form.fields.iter().map(|f| f.parameter_name.as_str()).collect();
//! assert_eq!(names, ["Name", "Force", "Verbose"]);
//! assert_eq!(form.fields[2].group, FieldGroup::Common);
//! assert_eq!(form.fields[1].widget, WidgetKind::BooleanToggle);
//! ```

use serde::{Deserialize, Serialize};

use crate::assemble::FieldValue;
use crate::{Parameter, ParameterSet};

/// Standard parameters shared by virtually every command.
pub const COMMON_PARAMETERS: &[&str] = &[
    "Confirm",
    "Debug",
    "ErrorAction",
    "ErrorVariable",
    "InformationAction",
    "InformationVariable",
    "OutBuffer",
    "OutVariable",
    "PipelineVariable",
    "ProgressAction",
    "Verbose",
    "WarningAction",
    "WarningVariable",
    "WhatIf",
];

/// Returns `true` if `name` is one of [`COMMON_PARAMETERS`].
pub fn is_common_parameter(name: &str) -> bool {
    COMMON_PARAMETERS.contains(&name)
}

/// Input widget used to collect a parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetKind {
    /// Pick one of a closed value set.
    EnumeratedChoice {
        values: Vec<String>,
        /// An explicit "no value" option comes first.
        allow_none: bool,
    },
    /// Presence flag.
    BooleanToggle,
    /// Any text.
    FreeText,
}

impl WidgetKind {
    /// Chooses the widget for a parameter.
    ///
    /// A closed value set wins over the switch type.
    pub fn for_parameter(parameter: &Parameter, required: bool) -> Self {
        if parameter.is_enumerated() {
            Self::EnumeratedChoice {
                values: parameter.enumerated_values.clone(),
                allow_none: !required,
            }
        } else if parameter.is_switch() {
            Self::BooleanToggle
        } else {
            Self::FreeText
        }
    }

    pub fn is_toggle(&self) -> bool {
        matches!(self, Self::BooleanToggle)
    }
}

/// Which visual area a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    /// One of the interpreter's standard parameters.
    Common,
    /// Specific to the command.
    Unique,
}

impl FieldGroup {
    pub fn of(name: &str) -> Self {
        if is_common_parameter(name) {
            Self::Common
        } else {
            Self::Unique
        }
    }
}

/// One option of an enumerated choice. `None` is the "no value" option.
pub type ChoiceOption<'a> = Option<&'a str>;

/// A derived input field for one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub parameter_name: String,
    pub parameter_type: String,
    pub widget: WidgetKind,
    pub required: bool,
    pub group: FieldGroup,
    /// Pre-filled value. Required toggles start switched on.
    pub initial: Option<FieldValue>,
}

impl FormField {
    pub fn from_parameter(parameter: &Parameter, required: bool) -> Self {
        let widget = WidgetKind::for_parameter(parameter, required);
        let initial = (required && widget.is_toggle()).then_some(FieldValue::Toggle(true));
        Self {
            parameter_name: parameter.name.clone(),
            parameter_type: parameter.type_name.clone(),
            widget,
            required,
            group: FieldGroup::of(&parameter.name),
            initial,
        }
    }

    /// Whether the consumer must collect a value before submitting.
    pub fn requires_value(&self) -> bool {
        self.required && !self.widget.is_toggle()
    }

    /// Options of an enumerated choice, "no value" first when allowed.
    ///
    /// Empty for other widgets.
    pub fn options(&self) -> Vec<ChoiceOption<'_>> {
        match &self.widget {
            WidgetKind::EnumeratedChoice { values, allow_none } => {
                let none = allow_none.then_some(None);
                none.into_iter()
                    .chain(values.iter().map(|v| Some(v.as_str())))
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Builds the ordered field list for one parameter set.
///
/// Pure: the same set always yields the same fields.
pub fn synthesize_form(set: &ParameterSet) -> Vec<FormField> {
    let mut required: Vec<&Parameter> = live_parameters(&set.required_parameters).collect();
    let mut optional: Vec<&Parameter> = live_parameters(&set.optional_parameters).collect();
    required.sort_by(|a, b| a.name.cmp(&b.name));
    optional.sort_by(|a, b| a.name.cmp(&b.name));

    required
        .into_iter()
        .map(|p| FormField::from_parameter(p, true))
        .chain(optional.into_iter().map(|p| FormField::from_parameter(p, false)))
        .collect()
}

fn live_parameters(parameters: &[Parameter]) -> impl Iterator<Item = &Parameter> {
    parameters.iter().filter(|p| !p.name.trim().is_empty())
}

/// Form description for one command and parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub command: String,
    pub set_name: String,
    pub fields: Vec<FormField>,
}

impl Form {
    pub fn new(command: &str, set: &ParameterSet) -> Self {
        Self {
            command: command.to_string(),
            set_name: set.set_name.clone(),
            fields: synthesize_form(set),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.parameter_name == name)
    }

    /// Fields of one group, in form order.
    pub fn fields_in(&self, group: FieldGroup) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(move |f| f.group == group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> ParameterSet {
        ParameterSet::new("Path")
            .with_required(Parameter::new("Path", "String[]"))
            .with_required(Parameter::new("Destination", "String"))
            .with_required(Parameter::new("Recurse", "SwitchParameter"))
            .with_optional(Parameter::new("WhatIf", "SwitchParameter"))
            .with_optional(
                Parameter::new("ErrorAction", "ActionPreference")
                    .with_values(["Stop", "Continue", "SilentlyContinue"]),
            )
            .with_optional(Parameter::new("Filter", "String"))
            .with_optional(Parameter::new("force", "SwitchParameter"))
    }

    #[test]
    fn test_required_precede_optional_and_sorted() {
        let fields = synthesize_form(&sample_set());
        let names: Vec<&str> = fields.iter().map(|f| f.parameter_name.as_str()).collect();
        assert_eq!(
            names,
            ["Destination", "Path", "Recurse", "ErrorAction", "Filter", "WhatIf", "force"]
        );
        assert!(fields[..3].iter().all(|f| f.required));
        assert!(fields[3..].iter().all(|f| !f.required));
    }

    #[test]
    fn test_synthesis_is_idempotent() {
        let set = sample_set();
        assert_eq!(synthesize_form(&set), synthesize_form(&set));
    }

    #[test]
    fn test_widget_selection() {
        let fields = synthesize_form(&sample_set());
        let by_name = |name: &str| fields.iter().find(|f| f.parameter_name == name).unwrap();

        assert_eq!(by_name("Filter").widget, WidgetKind::FreeText);
        assert_eq!(by_name("WhatIf").widget, WidgetKind::BooleanToggle);
        assert_eq!(
            by_name("ErrorAction").widget,
            WidgetKind::EnumeratedChoice {
                values: vec!["Stop".into(), "Continue".into(), "SilentlyContinue".into()],
                allow_none: true,
            }
        );
    }

    #[test]
    fn test_enumerated_switch_prefers_choice() {
        let param = Parameter::new("Mode", "SwitchParameter").with_values(["On"]);
        let field = FormField::from_parameter(&param, true);
        assert_eq!(
            field.widget,
            WidgetKind::EnumeratedChoice {
                values: vec!["On".into()],
                allow_none: false,
            }
        );
        assert_eq!(field.options(), vec![Some("On")]);
    }

    #[test]
    fn test_optional_choice_offers_none_first() {
        let param = Parameter::new("Scope", "String").with_values(["User", "Machine"]);
        let field = FormField::from_parameter(&param, false);
        assert_eq!(field.options(), vec![None, Some("User"), Some("Machine")]);
    }

    #[test]
    fn test_required_toggle_defaults_on() {
        let fields = synthesize_form(&sample_set());
        let recurse = fields.iter().find(|f| f.parameter_name == "Recurse").unwrap();
        assert_eq!(recurse.initial, Some(FieldValue::Toggle(true)));
        assert!(!recurse.requires_value());

        let path = fields.iter().find(|f| f.parameter_name == "Path").unwrap();
        assert!(path.requires_value());
        assert_eq!(path.initial, None);

        let what_if = fields.iter().find(|f| f.parameter_name == "WhatIf").unwrap();
        assert_eq!(what_if.initial, None);
    }

    #[test]
    fn test_common_partition() {
        let form = Form::new("Copy-Item", &sample_set());
        let common: Vec<&str> = form
            .fields_in(FieldGroup::Common)
            .map(|f| f.parameter_name.as_str())
            .collect();
        assert_eq!(common, ["ErrorAction", "WhatIf"]);
        assert_eq!(form.fields_in(FieldGroup::Unique).count(), 5);
    }

    #[test]
    fn test_blank_parameter_names_are_skipped() {
        let set = ParameterSet::new("X")
            .with_optional(Parameter::new("  ", "String"))
            .with_optional(Parameter::new("Name", "String"));
        let fields = synthesize_form(&set);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].parameter_name, "Name");
    }
}
