//! FASTQ Quality Stats Tool
//!
//! GC content, base quality and N-base metrics for a single FASTQ file.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use fastq_qc_tools::{
    base_quality, get_sample_name, init_logging, n_base_fraction, GcCalculator, GcRange,
    OutOfRangeLabel, TracingObserver,
};
use serde_json::json;
use std::path::PathBuf;

fn main() -> Result<()> {
    let matches = Command::new("fastq-quality-stats")
        .version("0.1.0")
        .about("GC content, base quality and N-base metrics for a FASTQ file")
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
                .help("Output JSON file for statistics")
                .default_value("quality_stats.json"),
        )
        .arg(
            Arg::new("gc_min")
                .long("gc-min")
                .value_name("PERCENT")
                .help("Lower bound of the expected GC range for the organism [default: 30]")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("gc_max")
                .long("gc-max")
                .value_name("PERCENT")
                .help("Upper bound of the expected GC range for the organism [default: 70]")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("gc_label")
                .long("gc-out-of-range-label")
                .value_name("LABEL")
                .help("Status reported when GC is out of range (warning|invalid)")
                .default_value("warning"),
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
    let output_file = PathBuf::from(
        matches
            .get_one::<String>("output")
            .context("--output has a default")?,
    );
    let gc_min = matches
        .get_one::<f64>("gc_min")
        .copied()
        .unwrap_or(GcRange::BROAD.min);
    let gc_max = matches
        .get_one::<f64>("gc_max")
        .copied()
        .unwrap_or(GcRange::BROAD.max);
    let gc_label: OutOfRangeLabel = matches
        .get_one::<String>("gc_label")
        .context("--gc-out-of-range-label has a default")?
        .parse()?;

    println!("🧬 FASTQ Quality Stats Tool");
    println!("Input: {}", input_file.display());
    println!("Output: {}", output_file.display());
    println!("Expected GC range: {:.1}-{:.1}%", gc_min, gc_max);

    if !input_file.exists() {
        anyhow::bail!("Input file does not exist: {}", input_file.display());
    }

    let observer = TracingObserver;
    let gc = GcCalculator::new(GcRange::new(gc_min, gc_max)?)
        .with_out_of_range_label(gc_label)
        .calculate(&input_file, &observer)?;
    let quality = base_quality(&input_file, &observer)?;
    let n_bases = n_base_fraction(&input_file, &observer)?;

    let sample_name = get_sample_name(&input_file);
    let stats = json!({
        "sample_name": sample_name,
        "gc_content": gc,
        "base_quality": quality,
        "n_bases": n_bases,
    });
    std::fs::write(&output_file, serde_json::to_string_pretty(&stats)?)?;

    println!("✅ Quality analysis complete!");
    println!("📈 Sample: {}", sample_name);
    println!("🔬 GC content: {:.2}% ({})", gc.gc_percentage, gc.status);
    println!(
        "⭐ Mean quality: Q{:.1} (min Q{}, max Q{}, median Q{:.1})",
        quality.mean_quality, quality.min_quality, quality.max_quality, quality.median_quality
    );
    println!("🎯 Q30 bases: {:.1}% ({})", quality.q30_percentage, quality.status);
    println!("❓ N bases: {:.2}% ({})", n_bases.n_percentage, n_bases.status);
    println!("💾 Results saved to: {}", output_file.display());

    Ok(())
}
