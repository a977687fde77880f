//! Linkspec Generator
//!
//! Expands a relationship-oriented API description into a fully explicit
//! Swagger 2.0 document.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use linkspec_define::SourceSchema;
use linkspec_gen::diagnostics;
use linkspec_gen::errors::GeneratorError;
use linkspec_gen::expand::{GeneratorOptions, expand};
use linkspec_gen::output;

/// Linkspec generator - expands relationship-oriented API definitions into
/// Swagger 2.0 documents
#[derive(Parser, Debug)]
#[command(name = "linkspec-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source schema file
    schema: PathBuf,

    /// Emit `<<` merge directives referencing shared bodies instead of
    /// inlining them
    #[arg(short = 'm', long)]
    yaml_merge: bool,

    /// Permit native aliasing in the encoded output
    #[arg(short = 'a', long)]
    yaml_alias: bool,

    /// Include implementation-private paths and properties
    #[arg(short = 'i', long)]
    include_impl: bool,

    /// Omit descriptive annotation fields from the output
    #[arg(short = 's', long)]
    suppress_annotations: bool,

    /// Write the document to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            diagnostics::fatal(&error.to_string(), &cli.schema.display().to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), GeneratorError> {
    let path = cli.schema.display().to_string();
    let source = fs::read_to_string(&cli.schema)
        .map_err(|source| GeneratorError::ReadError { path, source })?;
    let schema = SourceSchema::from_yaml_str(&source)?;

    if cli.verbose > 0 {
        eprintln!(
            "Expanding '{}' ({} entities)",
            schema.title(),
            schema.entities().map_or(0, |entities| entities.len())
        );
    }

    let options = GeneratorOptions {
        yaml_merge: cli.yaml_merge,
        yaml_alias: cli.yaml_alias,
        include_impl: cli.include_impl,
        suppress_annotations: cli.suppress_annotations,
    };
    let document = expand(&schema, options)?;
    let encoded = output::encode(&document)?;
    output::write(&encoded, cli.output.as_deref())?;

    if cli.verbose > 0 {
        if let Some(output_path) = &cli.output {
            eprintln!("Wrote {}", output_path.display());
        }
    }
    Ok(())
}
