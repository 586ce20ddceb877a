//! GC content calculation
//!
//! Tallies base composition over every sequence line of a FASTQ file and
//! classifies the resulting GC percentage against an expected range. The
//! right range depends on the organism, so callers always supply one.

use crate::error::{QcError, Result};
use crate::observer::{report_progress, QcEvent, QcObserver};
use crate::reader::{LineReader, RECORD_LINES};
use crate::round_to;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const OPERATION: &str = "gc_content";

/// Inclusive GC percentage range considered normal for a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GcRange {
    pub min: f64,
    pub max: f64,
}

impl GcRange {
    /// Narrow range for *E. coli* reads
    pub const E_COLI: GcRange = GcRange {
        min: 50.0,
        max: 51.0,
    };

    /// Permissive range covering most bacterial and eukaryotic samples
    pub const BROAD: GcRange = GcRange {
        min: 30.0,
        max: 70.0,
    };

    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(QcError::InvalidConfig(format!(
                "GC range must satisfy min <= max, got {}..{}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, gc_percentage: f64) -> bool {
        self.min <= gc_percentage && gc_percentage <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GcStatus {
    Valid,
    Warning,
    Invalid,
}

impl GcStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GcStatus::Valid => "valid",
            GcStatus::Warning => "warning",
            GcStatus::Invalid => "invalid",
        }
    }
}

impl fmt::Display for GcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status reported when GC content falls outside the expected range
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfRangeLabel {
    #[default]
    Warning,
    Invalid,
}

impl From<OutOfRangeLabel> for GcStatus {
    fn from(label: OutOfRangeLabel) -> Self {
        match label {
            OutOfRangeLabel::Warning => GcStatus::Warning,
            OutOfRangeLabel::Invalid => GcStatus::Invalid,
        }
    }
}

impl std::str::FromStr for OutOfRangeLabel {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "warning" => Ok(OutOfRangeLabel::Warning),
            "invalid" => Ok(OutOfRangeLabel::Invalid),
            other => Err(QcError::InvalidConfig(format!(
                "unknown GC out-of-range label '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcResult {
    pub gc_percentage: f64,
    /// G/C + A/T + N bases
    pub total_bases: u64,
    pub gc_bases: u64,
    pub at_bases: u64,
    pub n_bases: u64,
    pub in_expected_range: bool,
    pub status: GcStatus,
}

/// GC content calculator
pub struct GcCalculator {
    pub expected_range: GcRange,
    pub out_of_range_label: OutOfRangeLabel,
}

impl GcCalculator {
    pub fn new(expected_range: GcRange) -> Self {
        Self {
            expected_range,
            out_of_range_label: OutOfRangeLabel::default(),
        }
    }

    pub fn with_out_of_range_label(mut self, label: OutOfRangeLabel) -> Self {
        self.out_of_range_label = label;
        self
    }

    /// Calculate GC content over all sequence lines of a FASTQ file.
    ///
    /// N bases are left out of the percentage but reported in `total_bases`.
    pub fn calculate<P: AsRef<Path>>(
        &self,
        path: P,
        observer: &dyn QcObserver,
    ) -> Result<GcResult> {
        let path = path.as_ref();
        observer.on_event(&QcEvent::Started {
            operation: OPERATION,
            path,
        });

        let mut lines = LineReader::from_path(path)?;
        let mut counts = BaseCounts::default();
        let mut sequences = 0u64;
        let mut index = 0u64;

        while let Some(line) = lines.next_line()? {
            if index % RECORD_LINES == 1 {
                counts.add(line);
                sequences += 1;
                report_progress(observer, OPERATION, sequences);
            }
            index += 1;
        }

        let called = counts.gc + counts.at;
        if called == 0 {
            return Err(QcError::NoUsableBases {
                path: path.to_path_buf(),
                metric: OPERATION,
            });
        }

        let gc_percentage = round_to(counts.gc as f64 / called as f64 * 100.0, 2);
        let in_expected_range = self.expected_range.contains(gc_percentage);
        let status = if in_expected_range {
            GcStatus::Valid
        } else {
            self.out_of_range_label.into()
        };

        observer.on_event(&QcEvent::Finished {
            operation: OPERATION,
            path,
            details: format!("GC percentage: {:.2}%", gc_percentage),
        });
        if !in_expected_range {
            observer.on_event(&QcEvent::Warning {
                message: format!(
                    "GC content {:.2}% of {} is outside the expected range {}-{}%",
                    gc_percentage,
                    path.display(),
                    self.expected_range.min,
                    self.expected_range.max
                ),
            });
        }

        Ok(GcResult {
            gc_percentage,
            total_bases: called + counts.n,
            gc_bases: counts.gc,
            at_bases: counts.at,
            n_bases: counts.n,
            in_expected_range,
            status,
        })
    }
}

#[derive(Default)]
struct BaseCounts {
    gc: u64,
    at: u64,
    n: u64,
}

impl BaseCounts {
    fn add(&mut self, sequence: &[u8]) {
        for base in sequence {
            match base.to_ascii_uppercase() {
                b'G' | b'C' => self.gc += 1,
                b'A' | b'T' => self.at += 1,
                b'N' => self.n += 1,
                _ => {}
            }
        }
    }
}

/// Calculate GC content classified against `expected_range`
pub fn gc_content<P: AsRef<Path>>(
    path: P,
    expected_range: GcRange,
    observer: &dyn QcObserver,
) -> Result<GcResult> {
    GcCalculator::new(expected_range).calculate(path, observer)
}
