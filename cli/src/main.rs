use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use psform_core::{CommandDetails, FieldValues, Form, assemble_command, validate_submission};
use psform_discovery::config::InterpreterConfig;
use psform_discovery::output::{
    OutputFormat, format_commands, format_details, format_form, format_modules, format_snapshot,
};
use psform_discovery::parameters::parse_command_details;
use psform_discovery::{CancelToken, CaptureOptions, Introspector, ListingSnapshot};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "psform")]
#[command(about = "Introspect PowerShell commands and assemble valid invocations")]
struct Cli {
    /// Interpreter configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List installed modules (newest version per name).
    Modules(FormatArgs),
    /// List the exported commands of a module.
    Commands(CommandsArgs),
    /// Show the parameter sets of a command.
    Details(DetailsArgs),
    /// Describe the form for one parameter set of a command.
    Form(FormArgs),
    /// Assemble a command line from parameter values.
    Assemble(AssembleArgs),
    /// Parse captured parameter-set output from a file without running the interpreter.
    ParseFile(ParseFileArgs),
    /// Capture a module (and optionally command) listing.
    Catalog(CatalogArgs),
}

#[derive(Debug, Args)]
struct FormatArgs {
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct CommandsArgs {
    /// Module name.
    module: String,
    #[command(flatten)]
    output: FormatArgs,
}

#[derive(Debug, Args)]
struct DetailsArgs {
    /// Command name.
    command: String,
    #[command(flatten)]
    output: FormatArgs,
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Read captured parameter-set output from this file ('-' for stdin)
    /// instead of querying the interpreter.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Parameter set to use (default: the command's default set, else the
    /// alphabetically first).
    #[arg(long)]
    set: Option<String>,
}

#[derive(Debug, Args)]
struct FormArgs {
    /// Command name.
    command: String,
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    output: FormatArgs,
}

#[derive(Debug, Args)]
struct AssembleArgs {
    /// Command name.
    command: String,
    #[command(flatten)]
    source: SourceArgs,
    /// Parameter value as NAME=VALUE (repeatable).
    #[arg(long = "value", value_name = "NAME=VALUE")]
    values: Vec<String>,
    /// Switch parameter to turn on (repeatable).
    #[arg(long = "switch", value_name = "NAME")]
    switches: Vec<String>,
    /// Parameter values as a JSON object, e.g. '{"Name":"notepad","Force":true}'.
    #[arg(long)]
    values_json: Option<String>,
    /// Skip submission validation.
    #[arg(long)]
    no_validate: bool,
}

#[derive(Debug, Args)]
struct ParseFileArgs {
    /// Path to file containing captured parameter-set output.
    #[arg(long)]
    input: PathBuf,
    /// Command name used in form output.
    #[arg(long, default_value = "Command")]
    command: String,
    /// Print the form for the chosen parameter set instead of the details.
    #[arg(long)]
    form: bool,
    /// Parameter set for --form.
    #[arg(long)]
    set: Option<String>,
    #[command(flatten)]
    output: FormatArgs,
}

#[derive(Debug, Args)]
struct CatalogArgs {
    /// Also list every module's commands.
    #[arg(long)]
    with_commands: bool,
    /// Number of parallel command-listing jobs.
    #[arg(long)]
    jobs: Option<usize>,
    #[command(flatten)]
    output: FormatArgs,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Modules(args) => load_introspector(cli.config.as_deref())
            .and_then(|introspector| run_modules(&introspector, args)),
        Command::Commands(args) => load_introspector(cli.config.as_deref())
            .and_then(|introspector| run_commands(&introspector, args)),
        Command::Details(args) => load_introspector(cli.config.as_deref())
            .and_then(|introspector| run_details(&introspector, args)),
        Command::Form(args) => run_form(cli.config.as_deref(), args),
        Command::Assemble(args) => run_assemble(cli.config.as_deref(), args),
        Command::ParseFile(args) => run_parse_file(args),
        Command::Catalog(args) => load_introspector(cli.config.as_deref())
            .and_then(|introspector| run_catalog(&introspector, args)),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_introspector(config_path: Option<&Path>) -> Result<Introspector, String> {
    let config = match config_path {
        Some(path) => InterpreterConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => InterpreterConfig::default(),
    };
    debug!(
        primary = %config.primary.program,
        legacy = config.legacy.as_ref().map(|l| l.program.as_str()),
        timeout_ms = config.timeout_ms,
        "Using interpreter configuration"
    );
    Ok(Introspector::from_config(&config))
}

fn run_modules(introspector: &Introspector, args: FormatArgs) -> Result<(), String> {
    let modules = introspector.list_modules().map_err(|e| e.to_string())?;
    print!("{}", format_modules(&modules, args.format)?);
    Ok(())
}

fn run_commands(introspector: &Introspector, args: CommandsArgs) -> Result<(), String> {
    let commands = introspector
        .list_commands(&args.module)
        .map_err(|e| e.to_string())?;
    print!(
        "{}",
        format_commands(&args.module, &commands, args.output.format)?
    );
    Ok(())
}

fn run_details(introspector: &Introspector, args: DetailsArgs) -> Result<(), String> {
    let details = introspector
        .get_command_details(&args.command)
        .map_err(|e| e.to_string())?;
    print!(
        "{}",
        format_details(&args.command, &details, args.output.format)?
    );
    Ok(())
}

/// Command details from captured output or from the interpreter.
fn resolve_details(
    config_path: Option<&Path>,
    command: &str,
    source: &SourceArgs,
) -> Result<CommandDetails, String> {
    match &source.input {
        Some(path) => {
            let details = parse_command_details(&read_input(path)?);
            if details.parameter_sets.is_empty() {
                return Err(format!(
                    "No parameter sets found in '{}'",
                    path.display()
                ));
            }
            Ok(details)
        }
        None => load_introspector(config_path)?
            .get_command_details(command)
            .map_err(|e| e.to_string()),
    }
}

fn read_input(path: &Path) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        return Ok(raw);
    }
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn select_form(command: &str, details: &CommandDetails, set: Option<&str>) -> Result<Form, String> {
    let selected = match set {
        Some(name) => details.parameter_sets.get(name).ok_or_else(|| {
            let known: Vec<&str> = details.parameter_sets.names().collect();
            format!(
                "Unknown parameter set '{name}' for {command} (available: {})",
                known.join(", ")
            )
        })?,
        None => details
            .display_set()
            .ok_or_else(|| format!("{command} has no parameter sets"))?,
    };
    Ok(Form::new(command, selected))
}

fn run_form(config_path: Option<&Path>, args: FormArgs) -> Result<(), String> {
    let details = resolve_details(config_path, &args.command, &args.source)?;
    let form = select_form(&args.command, &details, args.source.set.as_deref())?;
    print!("{}", format_form(&form, args.output.format)?);
    Ok(())
}

fn run_assemble(config_path: Option<&Path>, args: AssembleArgs) -> Result<(), String> {
    let details = resolve_details(config_path, &args.command, &args.source)?;
    let form = select_form(&args.command, &details, args.source.set.as_deref())?;

    let mut values = FieldValues::initial(&form.fields);
    if let Some(json) = &args.values_json {
        let submitted =
            FieldValues::from_json(json).map_err(|e| format!("Invalid --values-json: {e}"))?;
        for (name, value) in submitted.iter() {
            values.set(name, value.clone());
        }
    }
    for pair in &args.values {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Expected NAME=VALUE, got '{pair}'"))?;
        values.set_text(name.trim().trim_start_matches('-'), value);
    }
    for name in &args.switches {
        values.set_toggle(name.trim().trim_start_matches('-'), true);
    }

    if !args.no_validate {
        let errors = validate_submission(&form, &values);
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(messages.join("; "));
        }
    }

    println!("{}", assemble_command(&form.command, &form.fields, &values));
    Ok(())
}

fn run_parse_file(args: ParseFileArgs) -> Result<(), String> {
    let raw = read_input(&args.input)?;
    let details = parse_command_details(&raw);
    if details.parameter_sets.is_empty() {
        return Err(format!(
            "No parameter sets found in '{}'",
            args.input.display()
        ));
    }

    if args.form {
        let form = select_form(&args.command, &details, args.set.as_deref())?;
        print!("{}", format_form(&form, args.output.format)?);
    } else {
        print!(
            "{}",
            format_details(&args.command, &details, args.output.format)?
        );
    }
    Ok(())
}

fn run_catalog(introspector: &Introspector, args: CatalogArgs) -> Result<(), String> {
    let options = CaptureOptions {
        with_commands: args.with_commands,
        jobs: args.jobs,
    };
    let snapshot = ListingSnapshot::capture(introspector, options, &CancelToken::new())
        .map_err(|e| e.to_string())?;
    if !snapshot.failures.is_empty() {
        eprintln!(
            "{} module(s) could not be listed: {}",
            snapshot.failures.len(),
            snapshot
                .failures
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    print!("{}", format_snapshot(&snapshot, args.output.format)?);
    Ok(())
}
