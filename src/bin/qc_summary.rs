//! FASTQ QC Summary Tool
//!
//! Multi-sample QC reporting and summary generation

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use fastq_qc_tools::reporting::QcReporter;
use fastq_qc_tools::{init_logging, GcRange, OutOfRangeLabel, QcConfig, TracingObserver};
use std::path::PathBuf;

fn main() -> Result<()> {
    let matches = Command::new("fastq-qc-summary")
        .version("0.1.0")
        .about("Validate and measure every FASTQ file in a directory")
        .arg(
            Arg::new("input_dir")
                .short('i')
                .long("input-dir")
                .value_name("DIRECTORY")
                .help("Directory containing FASTQ files")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("JSON")
                .help("Output JSON file for summary report")
                .default_value("qc_summary.json"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("JSON")
                .help("QC configuration file; command-line options override it"),
        )
        .arg(
            Arg::new("gc_min")
                .long("gc-min")
                .value_name("PERCENT")
                .help("Lower bound of the expected GC range for the organism")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("gc_max")
                .long("gc-max")
                .value_name("PERCENT")
                .help("Upper bound of the expected GC range for the organism")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("gc_label")
                .long("gc-out-of-range-label")
                .value_name("LABEL")
                .help("Status reported when GC is out of range (warning|invalid)"),
        )
        .arg(
            Arg::new("extension")
                .short('e')
                .long("extension")
                .value_name("EXT")
                .help("FASTQ file extension to scan for (repeatable)")
                .action(ArgAction::Append),
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

    let input_dir = PathBuf::from(
        matches
            .get_one::<String>("input_dir")
            .context("--input-dir is required")?,
    );
    let output_file = PathBuf::from(
        matches
            .get_one::<String>("output")
            .context("--output has a default")?,
    );

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => QcConfig::from_json_file(path)?,
        None => QcConfig::default(),
    };
    let gc_min = matches.get_one::<f64>("gc_min").copied();
    let gc_max = matches.get_one::<f64>("gc_max").copied();
    if gc_min.is_some() || gc_max.is_some() {
        config.gc_range = GcRange::new(
            gc_min.unwrap_or(config.gc_range.min),
            gc_max.unwrap_or(config.gc_range.max),
        )?;
    }
    if let Some(label) = matches.get_one::<String>("gc_label") {
        config.out_of_range_label = label.parse::<OutOfRangeLabel>()?;
    }
    if let Some(extensions) = matches.get_many::<String>("extension") {
        config.extensions = extensions.cloned().collect();
    }

    println!("📊 FASTQ QC Summary Tool");
    println!("Input directory: {}", input_dir.display());
    println!("Output: {}", output_file.display());
    println!(
        "Expected GC range: {:.1}-{:.1}%",
        config.gc_range.min, config.gc_range.max
    );

    // Validate input directory exists
    if !input_dir.exists() || !input_dir.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", input_dir.display());
    }

    let reporter = QcReporter::new(config);

    println!("📈 Analyzing FASTQ files...");
    let rows = reporter.aggregate_directory(&input_dir, &TracingObserver)?;

    for row in &rows {
        println!(
            "  {} {}: {} reads, GC {:.2}% ({}), Q{:.1} ({}), N {:.2}% ({})",
            if row.overall_pass { "✅" } else { "⚠️" },
            row.filename,
            row.total_reads,
            row.gc_percentage,
            row.gc_status,
            row.mean_quality,
            row.quality_status,
            row.n_percentage,
            row.n_status
        );
    }

    let multi_sample_report = reporter.generate_report(rows);
    reporter.export_json(&multi_sample_report, &output_file)?;

    println!("✅ QC summary complete!");
    println!("📊 Summary Statistics:");
    println!("  Total samples: {}", multi_sample_report.summary.total_samples);
    println!("  Passed samples: {}", multi_sample_report.summary.passed_samples);
    println!("  Failed samples: {}", multi_sample_report.summary.failed_samples);
    println!("  Pass rate: {:.1}%", multi_sample_report.summary.pass_rate);
    println!("  Average quality: {:.2}", multi_sample_report.summary.average_quality);
    println!("  Average GC: {:.2}%", multi_sample_report.summary.average_gc_content);
    println!("💾 Summary saved to: {}", output_file.display());

    Ok(())
}
