//! Output formatting for listings, command details and forms.

use psform_core::{Command, CommandDetails, FieldGroup, Form, FormField, Module, Parameter, WidgetKind};
use serde::Serialize;

use crate::listing::ListingSnapshot;

/// Supported output formats.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Option<Result<String, String>> {
    match format {
        OutputFormat::Json => Some(
            serde_json::to_string_pretty(value)
                .map_err(|e| format!("JSON serialization failed: {e}")),
        ),
        OutputFormat::Yaml => Some(
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}")),
        ),
        OutputFormat::Markdown | OutputFormat::Table => None,
    }
}

/// Formats a module list.
pub fn format_modules(modules: &[Module], format: OutputFormat) -> Result<String, String> {
    if let Some(out) = serialize(modules, format) {
        return out;
    }
    let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
    Ok(name_list("Modules", &names, format))
}

/// Formats a command list.
pub fn format_commands(
    module: &str,
    commands: &[Command],
    format: OutputFormat,
) -> Result<String, String> {
    if let Some(out) = serialize(commands, format) {
        return out;
    }
    let names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
    Ok(name_list(&format!("Commands of {module}"), &names, format))
}

fn name_list(title: &str, names: &[&str], format: OutputFormat) -> String {
    let mut out = String::new();
    if matches!(format, OutputFormat::Markdown) {
        out.push_str(&format!("# {title}\n\n"));
        for name in names {
            out.push_str(&format!("- `{name}`\n"));
        }
    } else {
        for name in names {
            out.push_str(name);
            out.push('\n');
        }
    }
    out
}

/// Formats the parameter sets of a command.
pub fn format_details(
    command: &str,
    details: &CommandDetails,
    format: OutputFormat,
) -> Result<String, String> {
    if let Some(out) = serialize(details, format) {
        return out;
    }
    Ok(match format {
        OutputFormat::Markdown => details_to_markdown(command, details),
        _ => details_to_table(command, details),
    })
}

fn details_to_markdown(command: &str, details: &CommandDetails) -> String {
    let mut out = format!("# {command}\n\n");
    for set in &details.parameter_sets {
        let marker = if details.default_parameter_set.as_deref() == Some(set.set_name.as_str()) {
            " (default)"
        } else {
            ""
        };
        out.push_str(&format!("## {}{marker}\n\n", set.set_name));
        if set.is_empty() {
            out.push_str("_No parameters._\n\n");
            continue;
        }
        out.push_str("| Parameter | Type | Required | Values |\n");
        out.push_str("|-----------|------|----------|--------|\n");
        let rows = set
            .required_parameters
            .iter()
            .map(|p| (p, true))
            .chain(set.optional_parameters.iter().map(|p| (p, false)));
        for (param, required) in rows {
            let required = if required { "yes" } else { "no" };
            out.push_str(&format!(
                "| `{}` | {} | {required} | {} |\n",
                param.name,
                param.type_name,
                param.enumerated_values.join(", ")
            ));
        }
        out.push('\n');
    }
    out
}

fn details_to_table(command: &str, details: &CommandDetails) -> String {
    let mut out = format!("Command: {command}");
    if let Some(default) = &details.default_parameter_set {
        out.push_str(&format!("  Default set: {default}"));
    }
    out.push('\n');
    for set in &details.parameter_sets {
        out.push_str(&format!("\n  [{}]\n", set.set_name));
        for param in &set.required_parameters {
            out.push_str(&parameter_line(param, true));
        }
        for param in &set.optional_parameters {
            out.push_str(&parameter_line(param, false));
        }
    }
    out
}

fn parameter_line(param: &Parameter, required: bool) -> String {
    let mut line = format!(
        "    {:<28} {:<20} {}",
        param.name,
        param.type_name,
        if required { "required" } else { "optional" }
    );
    if param.is_enumerated() {
        line.push_str(&format!("  {{{}}}", param.enumerated_values.join("|")));
    }
    line.trim_end().to_string() + "\n"
}

/// Formats a synthesized form.
pub fn format_form(form: &Form, format: OutputFormat) -> Result<String, String> {
    if let Some(out) = serialize(form, format) {
        return out;
    }
    Ok(match format {
        OutputFormat::Markdown => form_to_markdown(form),
        _ => form_to_table(form),
    })
}

fn widget_label(field: &FormField) -> String {
    match &field.widget {
        WidgetKind::EnumeratedChoice { values, allow_none } => {
            let none = if *allow_none { "(none)|" } else { "" };
            format!("choice {{{none}{}}}", values.join("|"))
        }
        WidgetKind::BooleanToggle => {
            if field.initial.as_ref().is_some_and(|v| v.is_on()) {
                "toggle (on)".to_string()
            } else {
                "toggle".to_string()
            }
        }
        WidgetKind::FreeText => "text".to_string(),
    }
}

fn form_to_markdown(form: &Form) -> String {
    let mut out = format!("# {} [{}]\n\n", form.command, form.set_name);
    for (group, title) in [(FieldGroup::Unique, "Parameters"), (FieldGroup::Common, "Common Parameters")] {
        let fields: Vec<&FormField> = form.fields_in(group).collect();
        if fields.is_empty() {
            continue;
        }
        out.push_str(&format!("## {title}\n\n"));
        out.push_str("| Field | Widget | Required |\n");
        out.push_str("|-------|--------|----------|\n");
        for field in fields {
            let required = if field.required { "yes" } else { "no" };
            out.push_str(&format!(
                "| `{}` | {} | {required} |\n",
                field.parameter_name,
                widget_label(field)
            ));
        }
        out.push('\n');
    }
    out
}

fn form_to_table(form: &Form) -> String {
    let mut out = format!("Form: {}  Set: {}\n", form.command, form.set_name);
    for (group, title) in [(FieldGroup::Unique, "Parameters"), (FieldGroup::Common, "Common")] {
        let fields: Vec<&FormField> = form.fields_in(group).collect();
        if fields.is_empty() {
            continue;
        }
        out.push_str(&format!("\n  {title}:\n"));
        for field in fields {
            let marker = if field.requires_value() { "*" } else { " " };
            out.push_str(&format!(
                "   {marker} {:<28} {}\n",
                field.parameter_name,
                widget_label(field)
            ));
        }
    }
    out
}

/// Formats a listing snapshot.
pub fn format_snapshot(snapshot: &ListingSnapshot, format: OutputFormat) -> Result<String, String> {
    if let Some(out) = serialize(snapshot, format) {
        return out;
    }
    let markdown = matches!(format, OutputFormat::Markdown);
    let mut out = if markdown {
        format!("# Modules ({})\n\n", snapshot.captured_at.to_rfc3339())
    } else {
        format!("Captured: {}\n", snapshot.captured_at.to_rfc3339())
    };
    for module in &snapshot.modules {
        if markdown {
            out.push_str(&format!("- `{}`\n", module.name));
        } else {
            out.push_str(&format!("{}\n", module.name));
        }
        let indent = if markdown { "  - " } else { "  " };
        if let Some(commands) = snapshot.commands_of(&module.name) {
            for command in commands {
                out.push_str(&format!("{indent}{}\n", command.name));
            }
        }
        if let Some(error) = snapshot.failures.get(&module.name) {
            out.push_str(&format!("{indent}! {error}\n"));
        }
    }
    Ok(out)
}
