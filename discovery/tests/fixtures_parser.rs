use std::fs;
use std::path::PathBuf;

use psform_core::{
    CommandDetails, FieldGroup, FieldValues, Form, Parameter, ParameterSet, WidgetKind,
    assemble_command, validate_submission,
};
use psform_discovery::commands::parse_commands;
use psform_discovery::modules::parse_modules;
use psform_discovery::parameters::parse_command_details;
use psform_discovery::runner::ScriptedRunner;
use psform_discovery::{Introspector, IntrospectionError};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

/// Renders sets back into the `set|required|optional` line format.
fn encode(sets: &[ParameterSet]) -> String {
    let encode_params = |params: &[Parameter]| {
        params
            .iter()
            .map(|p| format!("{},{},{}", p.name, p.type_name, p.enumerated_values.join(";")))
            .collect::<Vec<_>>()
            .join(" ")
    };
    sets.iter()
        .map(|s| {
            format!(
                "{}|{}|{}\n",
                s.set_name,
                encode_params(&s.required_parameters),
                encode_params(&s.optional_parameters)
            )
        })
        .collect()
}

#[test]
fn test_module_fixture_dedups_pester() {
    let modules = parse_modules(&fixture("modules.txt"));
    let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Microsoft.PowerShell.Archive",
            "Microsoft.PowerShell.Management",
            "Microsoft.PowerShell.Utility",
            "PackageManagement",
            "Pester",
            "PowerShellGet",
            "PSReadLine",
        ]
    );
}

#[test]
fn test_crlf_command_fixture() {
    let commands = parse_commands(&fixture("archive-commands.txt"));
    let names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Compress-Archive", "Expand-Archive"]);
}

#[test]
fn test_get_process_fixture() {
    let details = parse_command_details(&fixture("get-process-sets.txt"));
    let names: Vec<&str> = details.parameter_sets.names().collect();
    assert_eq!(
        names,
        [
            "Name",
            "NameWithUserName",
            "IdWithUserName",
            "Id",
            "InputObjectWithUserName",
            "InputObject",
        ]
    );
    assert_eq!(details.default_parameter_set, None);
    assert_eq!(details.display_set_name(), Some("Id"));

    let by_name = details.parameter_sets.get("Name").unwrap();
    assert!(by_name.required_parameters.is_empty());
    assert_eq!(by_name.optional_parameters.len(), 8);
    assert_eq!(
        by_name.optional_parameters[7],
        Parameter::new("WarningAction", "ActionPreference")
    );

    let form = Form::new("Get-Process", details.parameter_sets.get("IdWithUserName").unwrap());
    let required: Vec<&str> = form
        .fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.parameter_name.as_str())
        .collect();
    assert_eq!(required, ["Id", "IncludeUserName"]);
    let common: Vec<&str> = form
        .fields_in(FieldGroup::Common)
        .map(|f| f.parameter_name.as_str())
        .collect();
    assert_eq!(common, ["Debug", "ErrorAction", "Verbose"]);
}

#[test]
fn test_execution_policy_fixture_end_to_end() {
    let details = parse_command_details(&fixture("set-executionpolicy-sets.txt"));
    assert_eq!(details.default_parameter_set.as_deref(), Some("(Default)"));
    assert!(
        details
            .parameter_sets
            .get("this line lost its delimiters")
            .unwrap()
            .is_empty()
    );

    let form = Form::new("Set-ExecutionPolicy", details.display_set().unwrap());
    let policy = form.field("ExecutionPolicy").unwrap();
    assert!(policy.required);
    assert!(matches!(
        &policy.widget,
        WidgetKind::EnumeratedChoice { values, allow_none: false } if values.len() == 7
    ));
    let scope = form.field("Scope").unwrap();
    assert_eq!(scope.options()[0], None);

    let mut values = FieldValues::initial(&form.fields);
    values.set_text("ExecutionPolicy", "RemoteSigned");
    values.set_text("Scope", "CurrentUser");
    values.set_toggle("Force", true);
    assert!(validate_submission(&form, &values).is_empty());
    assert_eq!(
        assemble_command(&form.command, &form.fields, &values),
        "Set-ExecutionPolicy -ExecutionPolicy RemoteSigned -Force -Scope CurrentUser"
    );
}

#[test]
fn test_encode_then_parse_preserves_sets() {
    let sets = vec![
        ParameterSet::new("Path")
            .with_required(Parameter::new("Path", "String[]"))
            .with_optional(Parameter::new("Encoding", "Encoding").with_values(["utf8", "ascii"]))
            .with_optional(Parameter::new("NoNewline", "SwitchParameter")),
        ParameterSet::new("(Default)")
            .with_required(Parameter::new("LiteralPath", "String[]"))
            .with_required(Parameter::new("Value", "Object[]")),
        ParameterSet::new("Empty"),
    ];

    let parsed = parse_command_details(&encode(&sets));
    let expected = CommandDetails {
        parameter_sets: sets.into_iter().collect(),
        default_parameter_set: Some("(Default)".to_string()),
    };
    assert_eq!(parsed, expected);
}

#[test]
fn test_introspector_over_scripted_interpreters() {
    let primary = ScriptedRunner::new("pwsh")
        .respond(fixture("modules.txt"))
        .respond("")
        .respond(fixture("set-executionpolicy-sets.txt"))
        .respond("");
    let legacy = ScriptedRunner::new("powershell").respond(fixture("archive-commands.txt"));
    let introspector = Introspector::new(Box::new(primary)).with_legacy(Box::new(legacy));

    assert_eq!(introspector.list_modules().unwrap().len(), 7);
    let commands = introspector
        .list_commands("Microsoft.PowerShell.Archive")
        .unwrap();
    assert_eq!(commands.len(), 2);

    let details = introspector
        .get_command_details("Set-ExecutionPolicy")
        .unwrap();
    assert_eq!(details.parameter_sets.len(), 2);

    let err = introspector.get_command_details("Get-Nothing").unwrap_err();
    assert!(matches!(err, IntrospectionError::EmptyOutput { .. }));
}
