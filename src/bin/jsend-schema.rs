//! JSend Schema CLI
//!
//! Command-line interface for validating payloads against operation schemas
//! and generating apidoc artifact blocks from an operations manifest.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;

use jsend_schema::{
    artifact_file_name, load_json, operation_block, project_manifest, shared_definitions,
    validate_against_schema, validate_output, ApidocConfig, Operation, ValidateError, Verb,
};

#[derive(Parser)]
#[command(name = "jsend-schema")]
#[command(about = "Validate JSend payloads and generate apidoc blocks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a payload file against a schema file
    Validate {
        /// Payload file to validate
        payload: PathBuf,

        /// Schema file to validate against
        #[arg(long)]
        schema: PathBuf,

        /// Validate as a handler result (wrapped so scalars validate too)
        #[arg(long)]
        result: bool,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Generate apidoc artifact blocks from an operations manifest
    Doc {
        /// Operations manifest (JSON)
        manifest: PathBuf,

        /// Output directory (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            payload,
            schema,
            result,
            json,
        } => run_validate(&payload, &schema, result, json),
        Commands::Doc { manifest, output } => run_doc(&manifest, output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_validate(payload_path: &Path, schema_path: &Path, result: bool, json: bool) -> Result<(), u8> {
    let schema = load_json(schema_path).map_err(|e| {
        report_error(json, &format!("loading schema: {}", e));
        e.exit_code() as u8
    })?;
    let payload = load_json(payload_path).map_err(|e| {
        report_error(json, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;

    let outcome = if result {
        validate_output(&schema, &payload)
    } else {
        validate_against_schema(&schema, &payload)
    };

    match outcome {
        Ok(()) => {
            if json {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e @ ValidateError::InvalidSchema { .. }) => {
            report_error(json, &e.to_string());
            Err(2)
        }
    }
}

/// Operations manifest consumed by `doc`.
#[derive(Deserialize)]
struct Manifest {
    #[serde(flatten)]
    config: ApidocConfig,
    #[serde(default)]
    operations: Vec<OperationEntry>,
}

#[derive(Deserialize)]
struct OperationEntry {
    verb: String,
    url: String,
    name: String,
    #[serde(default)]
    description: String,
    input_schema: Option<Value>,
    output_schema: Option<Value>,
    input_example: Option<Value>,
    output_example: Option<Value>,
}

impl OperationEntry {
    fn into_operation(self) -> Result<Operation, String> {
        let verb = Verb::parse(&self.verb)
            .ok_or_else(|| format!("unknown verb \"{}\" for {}", self.verb, self.url))?;

        // Documentation-only operations never run a handler.
        let mut op = Operation::new(verb, self.url, self.name, |_| Ok(Value::Null))
            .description(self.description);
        if let Some(schema) = self.input_schema {
            op = op.input_schema(schema);
        }
        if let Some(schema) = self.output_schema {
            op = op.output_schema(schema);
        }
        if let Some(example) = self.input_example {
            op = op.input_example(example);
        }
        if let Some(example) = self.output_example {
            op = op.output_example(example);
        }
        Ok(op)
    }
}

fn run_doc(manifest_path: &Path, output: Option<&Path>) -> Result<(), u8> {
    let raw = load_json(manifest_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let manifest: Manifest = serde_json::from_value(raw).map_err(|e| {
        eprintln!("Error: invalid manifest: {}", e);
        2u8
    })?;

    let mut blocks = Vec::new();
    for entry in manifest.operations {
        let op = entry.into_operation().map_err(|message| {
            eprintln!("Error: {}", message);
            2u8
        })?;
        let block = operation_block(&op, &manifest.config).map_err(|e| {
            eprintln!("Error: {}", e);
            2u8
        })?;
        blocks.push((artifact_file_name(&op), block));
    }

    match output {
        Some(dir) => {
            let version_dir = dir.join(&manifest.config.version);
            std::fs::create_dir_all(&version_dir).map_err(|e| {
                eprintln!("Error creating {}: {}", version_dir.display(), e);
                3u8
            })?;

            write_file(&dir.join("apidoc.json"), &project_manifest(&manifest.config))?;
            write_file(&version_dir.join("errors.txt"), &shared_definitions())?;
            for (file_name, block) in &blocks {
                write_file(&version_dir.join(file_name), block)?;
            }
        }
        None => {
            println!("{}", shared_definitions());
            for (_, block) in &blocks {
                println!();
                println!("{}", block);
            }
        }
    }

    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<(), u8> {
    std::fs::write(path, format!("{}\n", content)).map_err(|e| {
        eprintln!("Error writing {}: {}", path.display(), e);
        3u8
    })
}

/// Output an error message in plain text or JSON format.
fn report_error(json: bool, msg: &str) {
    if json {
        println!(r#"{{"valid":false,"error":"{}"}}"#, msg);
    } else {
        eprintln!("Error: {}", msg);
    }
}
