use std::fs;
use std::path::PathBuf;
use std::process::Output;

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn psform(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_psform"))
        .args(args)
        .output()
        .expect("failed to run psform")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// parse-file
// ---------------------------------------------------------------------------

#[test]
fn parse_file_emits_details_as_json() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&["parse-file", "--input", &input, "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let sets = parsed["parameter_sets"].as_array().unwrap();
    assert_eq!(sets.len(), 3);
    assert_eq!(sets[0]["set_name"], "Id");
    assert_eq!(sets[0]["required_parameters"][0]["type"], "Int32[]");
    assert!(parsed["default_parameter_set"].is_null());
}

#[test]
fn parse_file_form_uses_first_set_by_name() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&[
        "parse-file",
        "--input",
        &input,
        "--command",
        "Stop-Process",
        "--form",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.starts_with("Form: Stop-Process  Set: Id\n"));
    assert!(out.contains("* Id"));
    assert!(out.contains("choice {(none)|Stop|Continue|SilentlyContinue}"));
}

#[test]
fn parse_file_missing_input_fails() {
    let output = psform(&["parse-file", "--input", "/nonexistent/psform/sets.txt"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error: Failed to read"));
}

#[test]
fn parse_file_without_sets_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.txt");
    fs::write(&path, "\n\n").unwrap();

    let output = psform(&["parse-file", "--input", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No parameter sets found"));
}

// ---------------------------------------------------------------------------
// form / assemble over captured output
// ---------------------------------------------------------------------------

#[test]
fn form_json_lists_required_fields_first() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&[
        "form",
        "Stop-Process",
        "--input",
        &input,
        "--set",
        "Name",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let form: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(form["set_name"], "Name");
    let names: Vec<&str> = form["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["parameter_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Name", "Force", "PassThru", "WhatIf"]);
    assert_eq!(form["fields"][3]["group"], "common");
}

#[test]
fn form_unknown_set_fails() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&["form", "Stop-Process", "--input", &input, "--set", "Nope"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown parameter set 'Nope'"));
}

#[test]
fn assemble_value_and_switch() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&[
        "assemble",
        "Stop-Process",
        "--input",
        &input,
        "--value",
        "Id=42",
        "--switch",
        "Force",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Stop-Process -Id 42 -Force\n");
}

#[test]
fn assemble_quotes_values_with_spaces() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&[
        "assemble",
        "Stop-Process",
        "--input",
        &input,
        "--set",
        "Name",
        "--value",
        "Name=my app",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Stop-Process -Name \"my app\"\n");
}

#[test]
fn assemble_values_from_json() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&[
        "assemble",
        "Stop-Process",
        "--input",
        &input,
        "--values-json",
        r#"{"Id":"7","PassThru":true,"WhatIf":false}"#,
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Stop-Process -Id 7 -PassThru\n");
}

#[test]
fn assemble_accepts_numeric_json_values() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&[
        "assemble",
        "Stop-Process",
        "--input",
        &input,
        "--values-json",
        r#"{"Id": 7}"#,
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Stop-Process -Id 7\n");
}

#[test]
fn assemble_switch_given_as_true_text() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&[
        "assemble",
        "Stop-Process",
        "--input",
        &input,
        "--value",
        "Id=3",
        "--value",
        "Force=true",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Stop-Process -Id 3 -Force\n");
}

#[test]
fn assemble_rejects_missing_required_value() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&["assemble", "Stop-Process", "--input", &input, "--switch", "Force"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("a value is required for -Id"));
}

#[test]
fn assemble_rejects_value_outside_choice() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&[
        "assemble",
        "Stop-Process",
        "--input",
        &input,
        "--value",
        "Id=1",
        "--value",
        "ErrorAction=Explode",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("'Explode' is not an allowed value for -ErrorAction"));
}

#[test]
fn assemble_without_validation_still_builds() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&[
        "assemble",
        "Stop-Process",
        "--input",
        &input,
        "--no-validate",
        "--switch",
        "WhatIf",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Stop-Process -WhatIf\n");
}

#[test]
fn assemble_rejects_malformed_pair() {
    let input = fixture("stop-process-sets.txt");
    let output = psform(&["assemble", "Stop-Process", "--input", &input, "--value", "Id"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Expected NAME=VALUE"));
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn invalid_config_is_reported_before_running_anything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("psform.yaml");
    fs::write(&path, "primary: [not, a, mapping]\n").unwrap();

    let output = psform(&["modules", "--config", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to load config"));
}
