//! FASTQ QC Tools
//!
//! Structural validation and quality metrics for raw FASTQ sequencing reads.
//!
//! This library provides:
//! - Streaming FASTQ record reading
//! - Structural validation with bounded error collection
//! - Paired-end (R1/R2) consistency checks
//! - GC content, base quality and N-base metrics
//! - Multi-sample QC reporting
//!
//! Each metric streams its own pass over the file and returns a plain,
//! serializable result; progress goes to a caller-supplied [`QcObserver`].

pub mod config;
pub mod error;
pub mod gc;
pub mod nbase;
pub mod observer;
pub mod paired;
pub mod quality;
pub mod reader;
pub mod reporting;
pub mod validation;

pub use config::QcConfig;
pub use error::{QcError, Result};
pub use gc::{gc_content, GcCalculator, GcRange, GcResult, GcStatus, OutOfRangeLabel};
pub use nbase::{n_base_fraction, NBaseResult, NBaseStatus};
pub use observer::{NoopObserver, QcEvent, QcObserver, TracingObserver};
pub use paired::{validate_pair, PairChecker, PairValidationResult};
pub use quality::{base_quality, QualityAnalyzer, QualityResult, QualityStatus};
pub use reader::{FastqReader, FastqRecord};
pub use reporting::{FileQcSummary, MultiSampleReport, QcReporter};
pub use validation::{validate, FastqValidator, ValidationResult};

use std::path::Path;

/// Sample name from a FASTQ path: the file name without its extension
pub fn get_sample_name<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Round to `decimals` places, exact halves going to the even neighbour
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Install a `tracing` subscriber for the command-line tools
pub fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
        .with_writer(std::io::stderr)
        .init();
}
