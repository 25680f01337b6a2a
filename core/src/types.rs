//! Introspection data model.
//!
//! These are plain value records: they are built by the discovery crate from
//! interpreter output, owned by whoever requested them, and never mutated
//! behind the caller's back. All of them serialize with [`serde`] so the CLI
//! can emit them as JSON or YAML.

use serde::{Deserialize, Serialize};

/// Set name the interpreter emits for its default parameter set.
pub const DEFAULT_SET_SENTINEL: &str = "(Default)";

/// Set name used for commands whose parameters all live in one implicit set.
pub const ALL_PARAMETER_SETS: &str = "__AllParameterSets";

/// Parameter type name that renders as a boolean toggle.
pub const SWITCH_PARAMETER_TYPE: &str = "SwitchParameter";

/// Returns `true` if `set_name` marks the interpreter's default set.
///
/// # Examples
///
/// ```
/// use psform_core::is_default_set_name;
///
/// assert!(is_default_set_name("(Default)"));
/// assert!(is_default_set_name("__AllParameterSets"));
/// assert!(!is_default_set_name("ByName"));
/// ```
pub fn is_default_set_name(set_name: &str) -> bool {
    set_name == DEFAULT_SET_SENTINEL || set_name == ALL_PARAMETER_SETS
}

/// An installed module. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A command exported by a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One parameter of a parameter set.
///
/// `enumerated_values` is empty unless the interpreter reported a closed
/// value set for the parameter.
///
/// # Examples
///
/// ```
/// use psform_core::Parameter;
///
/// let force = Parameter::new("Force", "SwitchParameter");
/// assert!(force.is_switch());
///
/// let scope = Parameter::new("Scope", "String").with_values(["Process", "User"]);
/// assert!(scope.is_enumerated());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub enumerated_values: Vec<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            enumerated_values: Vec::new(),
        }
    }

    /// Sets the closed value set.
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enumerated_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_switch(&self) -> bool {
        self.type_name == SWITCH_PARAMETER_TYPE
    }

    pub fn is_enumerated(&self) -> bool {
        !self.enumerated_values.is_empty()
    }
}

/// A named combination of parameters valid for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub set_name: String,
    #[serde(default)]
    pub required_parameters: Vec<Parameter>,
    #[serde(default)]
    pub optional_parameters: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new(set_name: impl Into<String>) -> Self {
        Self {
            set_name: set_name.into(),
            required_parameters: Vec::new(),
            optional_parameters: Vec::new(),
        }
    }

    pub fn with_required(mut self, parameter: Parameter) -> Self {
        self.required_parameters.push(parameter);
        self
    }

    pub fn with_optional(mut self, parameter: Parameter) -> Self {
        self.optional_parameters.push(parameter);
        self
    }

    /// Iterates required then optional parameters.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.required_parameters
            .iter()
            .chain(self.optional_parameters.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.required_parameters.is_empty() && self.optional_parameters.is_empty()
    }
}

/// Parameter sets of one command keyed by set name.
///
/// Keys are unique and iteration follows first-encounter order. Inserting a
/// set whose name is already present replaces the stored set in place.
///
/// # Examples
///
/// ```
/// use psform_core::{ParameterSet, ParameterSets};
///
/// let mut sets = ParameterSets::default();
/// sets.insert(ParameterSet::new("Name"));
/// sets.insert(ParameterSet::new("Id"));
/// sets.insert(ParameterSet::new("Name"));
///
/// let names: Vec<&str> = sets.names().collect();
/// assert_eq!(names, ["Name", "Id"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSets {
    sets: Vec<ParameterSet>,
}

impl ParameterSets {
    /// Inserts `set`, replacing any existing set with the same name.
    pub fn insert(&mut self, set: ParameterSet) {
        match self.sets.iter_mut().find(|s| s.set_name == set.set_name) {
            Some(existing) => *existing = set,
            None => self.sets.push(set),
        }
    }

    pub fn get(&self, set_name: &str) -> Option<&ParameterSet> {
        self.sets.iter().find(|s| s.set_name == set_name)
    }

    pub fn contains(&self, set_name: &str) -> bool {
        self.get(set_name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|s| s.set_name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterSet> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl FromIterator<ParameterSet> for ParameterSets {
    fn from_iter<T: IntoIterator<Item = ParameterSet>>(iter: T) -> Self {
        let mut sets = Self::default();
        for set in iter {
            sets.insert(set);
        }
        sets
    }
}

impl<'a> IntoIterator for &'a ParameterSets {
    type Item = &'a ParameterSet;
    type IntoIter = std::slice::Iter<'a, ParameterSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

/// Everything the interpreter reports about a command's parameter sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDetails {
    pub parameter_sets: ParameterSets,
    /// Set carrying the interpreter's default-set sentinel, if any.
    pub default_parameter_set: Option<String>,
}

impl CommandDetails {
    /// Set to show first: the designated default, else the alphabetically
    /// first set name. Does not change [`Self::default_parameter_set`].
    ///
    /// # Examples
    ///
    /// ```
    /// use psform_core::{CommandDetails, ParameterSet};
    ///
    /// let details = CommandDetails {
    ///     parameter_sets: [ParameterSet::new("Path"), ParameterSet::new("LiteralPath")]
    ///         .into_iter()
    ///         .collect(),
    ///     default_parameter_set: None,
    /// };
    /// assert_eq!(details.display_set_name(), Some("LiteralPath"));
    /// assert!(details.default_parameter_set.is_none());
    /// ```
    pub fn display_set_name(&self) -> Option<&str> {
        if let Some(name) = self.default_parameter_set.as_deref() {
            if self.parameter_sets.contains(name) {
                return Some(name);
            }
        }
        self.parameter_sets.names().min()
    }

    /// The set returned by [`Self::display_set_name`].
    pub fn display_set(&self) -> Option<&ParameterSet> {
        self.display_set_name()
            .and_then(|name| self.parameter_sets.get(name))
    }
}
