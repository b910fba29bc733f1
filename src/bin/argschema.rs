//! argschema CLI
//!
//! Command-line interface for validating JSON instances, dereferencing
//! schemas, and linting schema files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use argschema::{
    lint, load_json, load_options, load_schema, FileStatus, Severity, ValidationOptions,
    ValidationPath, Validator,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "argschema")]
#[command(about = "Validate JSON against JSON Schema (draft-07 through 2020-12)")]
#[command(version)]
struct Cli {
    /// Log more (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an instance document against a schema
    Validate {
        /// Instance file to validate
        instance: PathBuf,

        /// Schema file
        #[arg(long, short)]
        schema: PathBuf,

        /// Treat `format` as an annotation instead of an assertion
        #[arg(long)]
        no_formats: bool,

        /// Reject keywords outside the schema's declared `$vocabulary`
        #[arg(long)]
        enforce_vocabularies: bool,

        /// Collect annotations (title, default, format, ...) per instance path
        #[arg(long)]
        annotations: bool,

        /// Maximum `$ref`/`$dynamicRef` hops along one branch
        #[arg(long)]
        max_depth: Option<usize>,

        /// JSON options file; flags given on the command line override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Follow `$ref`/`$dynamicRef` chains to a concrete schema
    Resolve {
        /// Schema file (the root document for internal references)
        schema: PathBuf,

        /// Reference to resolve instead of the root (e.g. "#/$defs/user")
        #[arg(long)]
        pointer: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Lint schema files for errors (syntax, broken refs, bad regexes, typos)
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Validate {
            instance,
            schema,
            no_formats,
            enforce_vocabularies,
            annotations,
            max_depth,
            config,
            json,
        } => run_validate(ValidateArgs {
            instance,
            schema,
            no_formats,
            enforce_vocabularies,
            annotations,
            max_depth,
            config,
            json_output: json,
        }),

        Commands::Resolve {
            schema,
            pointer,
            output,
            pretty,
        } => run_resolve(&schema, pointer.as_deref(), output, pretty),

        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct ValidateArgs {
    instance: PathBuf,
    schema: PathBuf,
    no_formats: bool,
    enforce_vocabularies: bool,
    annotations: bool,
    max_depth: Option<usize>,
    config: Option<PathBuf>,
    json_output: bool,
}

fn run_validate(args: ValidateArgs) -> Result<(), u8> {
    let ValidateArgs {
        instance: instance_path,
        schema: schema_path,
        no_formats,
        enforce_vocabularies,
        annotations,
        max_depth,
        config,
        json_output,
    } = args;

    let mut options = match &config {
        Some(path) => load_options(path).map_err(|e| {
            report_error(json_output, &format!("loading config: {}", e));
            e.exit_code() as u8
        })?,
        None => ValidationOptions::default(),
    };
    if no_formats {
        options = options.validate_formats(false);
    }
    if enforce_vocabularies {
        options = options.enforce_vocabularies(true);
    }
    if annotations {
        options = options.collect_annotations(true);
    }
    if let Some(depth) = max_depth {
        options = options.max_depth(depth);
    }
    tracing::debug!(?options, "validation options");

    let schema = load_schema(&schema_path).map_err(|e| {
        report_error(json_output, &format!("loading schema: {}", e));
        e.exit_code() as u8
    })?;
    let instance = load_json(&instance_path).map_err(|e| {
        report_error(json_output, &format!("loading instance: {}", e));
        e.exit_code() as u8
    })?;

    let validator = Validator::with_root_schema(schema.clone());
    let result = validator.validate(&instance, &schema, &options);

    if json_output {
        println!("{}", to_json(&result, false)?);
    } else if result.is_valid() {
        println!("Valid");
    } else {
        eprintln!("Validation failed:");
        for (path, error) in result.iter_errors() {
            eprintln!("  {}: {}", display_path(path), error);
        }
    }

    if result.is_valid() {
        Ok(())
    } else {
        Err(1)
    }
}

fn run_resolve(
    schema_path: &Path,
    pointer: Option<&str>,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let schema = load_schema(schema_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let target = match pointer {
        Some(reference) => json!({ "$ref": reference }),
        None => schema.clone(),
    };
    let validator = Validator::with_root_schema(schema);
    let resolved = validator.resolve_schema(&target).map_err(|e| {
        eprintln!("Error: {}", e);
        2u8
    })?;

    let json_output = to_json(&resolved, pretty)?;
    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

fn display_path(path: &ValidationPath) -> String {
    if path.is_root() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);

    if format == "json" {
        println!("{}", to_json(&result, true)?);
    } else {
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if result.is_ok() && (!strict || result.warnings == 0) {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.is_ok() && (!strict || result.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}
