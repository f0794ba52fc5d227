mod logging;
mod settings;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use settings::{CliSettings, OutputFormat, SettingsError, load_settings};
use shapecheck_core::{Document, Schema, SchemaError, SchemaNode, TypeDescriptor, parse_schema};
use shapecheck_validate::{any_exempt_paths, render_summary, resolve, validate};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid json in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "shapecheck", version, about = "Validate JSON documents against nested schemas")]
struct Cli {
    /// Settings file (defaults to ./shapecheck.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a document against a schema.
    Validate(ValidateArgs),
    /// Print a schema's notation and flattened paths.
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Schema file in the JSON schema language.
    #[arg(long, value_name = "SCHEMA")]
    schema: PathBuf,
    /// Document to validate; its root must be an object.
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,
    /// Output format; overrides the settings file.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let settings = load_settings(cli.config.as_deref())?;
    logging::init_logging(&settings.log).map_err(CliError::Logging)?;

    match cli.command {
        Command::Validate(args) => run_validate(args, &settings),
        Command::Schema(args) => run_schema(args),
    }
}

fn run_validate(args: ValidateArgs, settings: &CliSettings) -> Result<ExitCode, CliError> {
    let schema = read_schema(&args.schema)?;
    let document = read_document(&args.document)?;

    info!(
        event = "validation_started",
        schema = %args.schema.display(),
        document = %args.document.display(),
    );
    let result = validate(&schema, &document);

    match args.format.unwrap_or(settings.output) {
        OutputFormat::Text => println!("{}", render_summary(&result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    if result.is_valid() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn run_schema(args: SchemaArgs) -> Result<ExitCode, CliError> {
    let schema = read_schema(&args.schema)?;
    for line in outline(&schema) {
        println!("{line}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Notation on the first line, then one line per flattened path.
///
/// Optional paths carry `?`; paths whose subtree is never inspected carry `*`.
fn outline(schema: &Schema) -> Vec<String> {
    let resolved = resolve(schema);
    let paths = resolved.paths();
    let exempt = any_exempt_paths(&paths);

    let mut lines = vec![SchemaNode::Nested(schema.clone()).to_string()];
    for (path, node) in &paths {
        let optional = if resolved.optional_paths().contains(path) { "?" } else { "" };
        let any = if exempt.contains(path) { "*" } else { "" };
        let kind = match node {
            SchemaNode::Nested(_) => "mapping".to_string(),
            other => other.to_string(),
        };
        lines.push(format!("  {path}{optional}{any}: {kind}"));
    }
    lines
}

fn read_json(path: &Path) -> Result<Value, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_schema(path: &Path) -> Result<Schema, CliError> {
    let value = read_json(path)?;
    Ok(parse_schema(&value)?)
}

fn read_document(path: &Path) -> Result<Document, CliError> {
    match read_json(path)? {
        Value::Object(document) => Ok(document),
        other => Err(CliError::InvalidDocument(format!(
            "root of {} must be a mapping, found {}",
            path.display(),
            TypeDescriptor::of_value(&other)
        ))),
    }
}
