//! Linkspec Validator
//!
//! Structural linter for relationship-oriented API descriptions. Reports
//! `ERROR -` / `WARNING -` / `INFO -` diagnostics on stderr and exits
//! non-zero when the error count is non-zero; it never aborts on a single
//! bad keyword.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use linkspec_gen::diagnostics;
use linkspec_gen::validation::Validator;

/// Linkspec validator - structural linter for source schemas
#[derive(Parser, Debug)]
#[command(name = "linkspec-validate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source schema file
    schema: PathBuf,

    /// Print the final error count
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let path = cli.schema.display().to_string();

    let source = match fs::read_to_string(&cli.schema) {
        Ok(source) => source,
        Err(error) => {
            diagnostics::fatal(&format!("failed to read '{path}': {error}"), &path);
            return ExitCode::FAILURE;
        }
    };

    let mut validator = Validator::new(path);
    let errors = validator.validate_str(&source);
    if cli.verbose > 0 {
        eprintln!("{errors} error(s)");
    }
    if errors == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
