//! Base quality statistics
//!
//! Decodes Phred+33 quality lines and summarizes every score in the file.
//! Scores are tallied in a per-byte histogram instead of a flat list, which
//! keeps memory constant while giving exact mean, median, min and max.

use crate::error::{QcError, Result};
use crate::observer::{report_progress, QcEvent, QcObserver};
use crate::reader::{LineReader, RECORD_LINES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// ASCII offset of Sanger / Illumina 1.8+ quality encoding
pub const PHRED_OFFSET: u8 = 33;
/// Scores at or above this are Q30 bases
pub const Q30_THRESHOLD: i32 = 30;

pub const EXCELLENT_MIN_MEAN: f64 = 30.0;
pub const EXCELLENT_MIN_Q30_PERCENT: f64 = 90.0;
pub const GOOD_MIN_MEAN: f64 = 25.0;
pub const GOOD_MIN_Q30_PERCENT: f64 = 80.0;

const OPERATION: &str = "base_quality";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityStatus {
    Excellent,
    Good,
    Poor,
}

impl QualityStatus {
    /// Both conditions of a tier must hold; tiers are tried best first
    pub fn classify(mean_quality: f64, q30_percentage: f64) -> Self {
        if mean_quality >= EXCELLENT_MIN_MEAN && q30_percentage >= EXCELLENT_MIN_Q30_PERCENT {
            QualityStatus::Excellent
        } else if mean_quality >= GOOD_MIN_MEAN && q30_percentage >= GOOD_MIN_Q30_PERCENT {
            QualityStatus::Good
        } else {
            QualityStatus::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityStatus::Excellent => "excellent",
            QualityStatus::Good => "good",
            QualityStatus::Poor => "poor",
        }
    }

    pub fn is_acceptable(&self) -> bool {
        matches!(self, QualityStatus::Excellent | QualityStatus::Good)
    }
}

impl fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityResult {
    pub mean_quality: f64,
    pub min_quality: i32,
    pub max_quality: i32,
    pub median_quality: f64,
    pub q30_percentage: f64,
    pub total_bases: u64,
    pub status: QualityStatus,
}

/// Histogram of raw quality bytes
#[derive(Clone)]
pub struct QualityHistogram {
    counts: [u64; 256],
    total: u64,
}

impl Default for QualityHistogram {
    fn default() -> Self {
        Self {
            counts: [0; 256],
            total: 0,
        }
    }
}

impl QualityHistogram {
    pub fn add(&mut self, quality: &[u8]) {
        for &q in quality {
            self.counts[q as usize] += 1;
        }
        self.total += quality.len() as u64;
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    fn score(byte: usize) -> i32 {
        byte as i32 - PHRED_OFFSET as i32
    }

    fn occupied(&self) -> impl DoubleEndedIterator<Item = (usize, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(byte, &count)| (byte, count))
    }

    pub fn min(&self) -> Option<i32> {
        self.occupied().next().map(|(byte, _)| Self::score(byte))
    }

    pub fn max(&self) -> Option<i32> {
        self.occupied().next_back().map(|(byte, _)| Self::score(byte))
    }

    pub fn mean(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let sum: i64 = self
            .occupied()
            .map(|(byte, count)| Self::score(byte) as i64 * count as i64)
            .sum();
        Some(sum as f64 / self.total as f64)
    }

    /// Score at `rank` (0-based) in sorted order
    fn nth(&self, rank: u64) -> Option<i32> {
        let mut seen = 0u64;
        for (byte, count) in self.occupied() {
            seen += count;
            if rank < seen {
                return Some(Self::score(byte));
            }
        }
        None
    }

    /// Even counts take the mean of the two middle scores
    pub fn median(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let mid = self.total / 2;
        if self.total % 2 == 1 {
            self.nth(mid).map(f64::from)
        } else {
            let low = self.nth(mid - 1)?;
            let high = self.nth(mid)?;
            Some((low as f64 + high as f64) / 2.0)
        }
    }

    /// Bases scoring at least `threshold`, as a percentage of all bases
    pub fn percent_at_least(&self, threshold: i32) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let passing: u64 = self
            .occupied()
            .filter(|(byte, _)| Self::score(*byte) >= threshold)
            .map(|(_, count)| count)
            .sum();
        Some(passing as f64 * 100.0 / self.total as f64)
    }
}

/// Base quality calculator
pub struct QualityAnalyzer {
    pub q30_threshold: i32,
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self {
            q30_threshold: Q30_THRESHOLD,
        }
    }
}

impl QualityAnalyzer {
    /// Summarize every quality score in a FASTQ file
    pub fn analyze_fastq<P: AsRef<Path>>(
        &self,
        fastq_path: P,
        observer: &dyn QcObserver,
    ) -> Result<QualityResult> {
        let path = fastq_path.as_ref();
        observer.on_event(&QcEvent::Started {
            operation: OPERATION,
            path,
        });

        let mut lines = LineReader::from_path(path)?;
        let mut histogram = QualityHistogram::default();
        let mut records = 0u64;
        let mut index = 0u64;

        while let Some(line) = lines.next_line()? {
            if index % RECORD_LINES == 3 {
                histogram.add(line);
                records += 1;
                report_progress(observer, OPERATION, records);
            }
            index += 1;
        }

        let no_scores = || QcError::NoUsableBases {
            path: path.to_path_buf(),
            metric: OPERATION,
        };
        let mean_quality = histogram.mean().ok_or_else(no_scores)?;
        let min_quality = histogram.min().ok_or_else(no_scores)?;
        let max_quality = histogram.max().ok_or_else(no_scores)?;
        let median_quality = histogram.median().ok_or_else(no_scores)?;
        let q30_percentage = histogram
            .percent_at_least(self.q30_threshold)
            .ok_or_else(no_scores)?;
        let status = QualityStatus::classify(mean_quality, q30_percentage);

        observer.on_event(&QcEvent::Finished {
            operation: OPERATION,
            path,
            details: format!(
                "mean Q{:.1}, Q30 {:.1}%, status {}",
                mean_quality, q30_percentage, status
            ),
        });

        Ok(QualityResult {
            mean_quality,
            min_quality,
            max_quality,
            median_quality,
            q30_percentage,
            total_bases: histogram.total(),
            status,
        })
    }
}

pub fn base_quality<P: AsRef<Path>>(path: P, observer: &dyn QcObserver) -> Result<QualityResult> {
    QualityAnalyzer::default().analyze_fastq(path, observer)
}
