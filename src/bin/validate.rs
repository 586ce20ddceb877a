//! FASTQ Validate Tool
//!
//! Structural validation of a FASTQ file: record layout, sequence/quality
//! lengths and nucleotide alphabet.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use fastq_qc_tools::validation::{FastqValidator, MAX_VALIDATION_ERRORS};
use fastq_qc_tools::{init_logging, TracingObserver};
use std::path::PathBuf;

fn main() -> Result<()> {
    let matches = Command::new("fastq-validate")
        .version("0.1.0")
        .about("Validate the record structure of a FASTQ file")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FASTQ")
                .help("Input FASTQ file")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("JSON")
                .help("Optional JSON file for the validation result"),
        )
        .arg(
            Arg::new("max_errors")
                .long("max-errors")
                .value_name("COUNT")
                .help("Stop scanning once more errors than this are found")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    let input_file = PathBuf::from(
        matches
            .get_one::<String>("input")
            .context("--input is required")?,
    );
    let output_file = matches.get_one::<String>("output").map(PathBuf::from);
    let max_errors = matches
        .get_one::<usize>("max_errors")
        .copied()
        .unwrap_or(MAX_VALIDATION_ERRORS);

    println!("🧬 FASTQ Validate Tool");
    println!("Input: {}", input_file.display());

    let result = FastqValidator::new(max_errors).validate(&input_file, &TracingObserver)?;

    if result.valid {
        println!("✅ File is structurally valid");
    } else {
        println!("❌ File has structural errors:");
        for error in &result.errors {
            println!("  - {}", error);
        }
    }
    println!("📚 Total reads: {}", result.total_reads);
    println!("💾 File size: {:.2} MB", result.file_size_mb());

    if let Some(output_file) = output_file {
        let json_output = serde_json::to_string_pretty(&result)?;
        std::fs::write(&output_file, json_output)?;
        println!("💾 Results saved to: {}", output_file.display());
    }

    if !result.valid {
        std::process::exit(1);
    }
    Ok(())
}
