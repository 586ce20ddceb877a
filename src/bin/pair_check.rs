//! FASTQ Pair Check Tool
//!
//! Confirms that R1 and R2 mate files hold the same reads in the same order.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use fastq_qc_tools::paired::PairChecker;
use fastq_qc_tools::{init_logging, QcConfig, TracingObserver};
use std::path::PathBuf;

fn main() -> Result<()> {
    let matches = Command::new("fastq-pair-check")
        .version("0.1.0")
        .about("Check read counts and read IDs of paired-end FASTQ files")
        .arg(
            Arg::new("r1")
                .long("r1")
                .value_name("FASTQ")
                .help("Forward (R1) FASTQ file")
                .required(true),
        )
        .arg(
            Arg::new("r2")
                .long("r2")
                .value_name("FASTQ")
                .help("Reverse (R2) FASTQ file")
                .required(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("JSON")
                .help("QC configuration file; --sample-size overrides it"),
        )
        .arg(
            Arg::new("sample_size")
                .long("sample-size")
                .value_name("PAIRS")
                .help("Number of leading read pairs whose IDs are compared")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("JSON")
                .help("Optional JSON file for the pairing result"),
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

    let r1 = PathBuf::from(matches.get_one::<String>("r1").context("--r1 is required")?);
    let r2 = PathBuf::from(matches.get_one::<String>("r2").context("--r2 is required")?);
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => QcConfig::from_json_file(path)?,
        None => QcConfig::default(),
    };
    if let Some(sample_size) = matches.get_one::<u64>("sample_size") {
        config.pair_sample_size = *sample_size;
    }

    println!("🧬 FASTQ Pair Check Tool");
    println!("R1: {}", r1.display());
    println!("R2: {}", r2.display());

    let checker = PairChecker::from_config(&config);
    let result = checker.validate_pair(&r1, &r2, &TracingObserver)?;

    println!("📚 R1 reads: {}", result.r1_reads);
    println!("📚 R2 reads: {}", result.r2_reads);
    if result.paired {
        println!("✅ Files are properly paired");
    } else if result.r1_reads != result.r2_reads {
        println!("❌ Read counts differ");
    } else {
        println!("❌ Read IDs differ:");
        for mismatch in &result.mismatches {
            println!("  - {}", mismatch);
        }
    }

    if let Some(output_file) = matches.get_one::<String>("output").map(PathBuf::from) {
        std::fs::write(&output_file, serde_json::to_string_pretty(&result)?)?;
        println!("💾 Results saved to: {}", output_file.display());
    }

    if !result.paired {
        std::process::exit(1);
    }
    Ok(())
}
