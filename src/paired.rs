//! Paired-end consistency checks
//!
//! Mates (R1/R2) must hold the same number of reads, and reads at the same
//! position must share a read identifier once the mate designator is removed.
//! Only the first [`PAIR_SAMPLE_SIZE`] pairs are compared.

use crate::config::QcConfig;
use crate::error::{QcError, Result};
use crate::observer::{QcEvent, QcObserver};
use crate::reader::{count_reads, FastqReader};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Leading read pairs compared by header
pub const PAIR_SAMPLE_SIZE: u64 = 100;
/// Header comparison stops after this many mismatches
pub const MAX_PAIR_MISMATCHES: usize = 10;

const MATE_SUFFIXES: [&str; 4] = ["/1", "/2", ".1", ".2"];

const OPERATION: &str = "pair_validation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairValidationResult {
    pub paired: bool,
    pub r1_reads: u64,
    pub r2_reads: u64,
    /// `"{r1 id} vs {r2 id}"` for each differing pair
    pub mismatches: Vec<String>,
}

/// Read identifier shared by both mates: header without `@` or mate suffix
pub fn base_read_id(header: &str) -> &str {
    let header = header.trim();
    let id = header.strip_prefix('@').unwrap_or(header);
    MATE_SUFFIXES
        .iter()
        .find_map(|suffix| id.strip_suffix(suffix))
        .unwrap_or(id)
}

pub struct PairChecker {
    pub sample_size: u64,
    pub max_mismatches: usize,
}

impl Default for PairChecker {
    fn default() -> Self {
        Self {
            sample_size: PAIR_SAMPLE_SIZE,
            max_mismatches: MAX_PAIR_MISMATCHES,
        }
    }
}

impl PairChecker {
    pub fn new(sample_size: u64, max_mismatches: usize) -> Self {
        Self {
            sample_size,
            max_mismatches,
        }
    }

    /// Sample size from the run configuration, default mismatch cap
    pub fn from_config(config: &QcConfig) -> Self {
        Self::new(config.pair_sample_size, MAX_PAIR_MISMATCHES)
    }

    /// Check that two mate files describe the same fragments
    pub fn validate_pair<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        r1_path: P1,
        r2_path: P2,
        observer: &dyn QcObserver,
    ) -> Result<PairValidationResult> {
        let r1_path = r1_path.as_ref();
        let r2_path = r2_path.as_ref();
        for path in [r1_path, r2_path] {
            std::fs::metadata(path).map_err(|e| QcError::from_io(path, e))?;
        }
        observer.on_event(&QcEvent::Started {
            operation: OPERATION,
            path: r1_path,
        });

        let r1_reads = count_reads(r1_path)?;
        let r2_reads = count_reads(r2_path)?;

        // Headers are not compared once the counts disagree
        if r1_reads != r2_reads {
            observer.on_event(&QcEvent::Warning {
                message: format!(
                    "Read counts differ: {} has {}, {} has {}",
                    r1_path.display(),
                    r1_reads,
                    r2_path.display(),
                    r2_reads
                ),
            });
            return Ok(PairValidationResult {
                paired: false,
                r1_reads,
                r2_reads,
                mismatches: Vec::new(),
            });
        }

        let mut r1 = FastqReader::from_path(r1_path)?;
        let mut r2 = FastqReader::from_path(r2_path)?;
        let mut mismatches = Vec::new();

        for _ in 0..self.sample_size.min(r1_reads) {
            let (rec1, rec2) = match (r1.next_record()?, r2.next_record()?) {
                (Some(rec1), Some(rec2)) => (rec1, rec2),
                _ => break,
            };
            let id1 = base_read_id(&rec1.header);
            let id2 = base_read_id(&rec2.header);
            if id1 != id2 {
                mismatches.push(format!("{} vs {}", id1, id2));
                if mismatches.len() >= self.max_mismatches {
                    break;
                }
            }
        }

        let result = PairValidationResult {
            paired: mismatches.is_empty(),
            r1_reads,
            r2_reads,
            mismatches,
        };
        observer.on_event(&QcEvent::Finished {
            operation: OPERATION,
            path: r1_path,
            details: format!(
                "{} read pairs, {} header mismatches, paired={}",
                result.r1_reads,
                result.mismatches.len(),
                result.paired
            ),
        });
        Ok(result)
    }
}

/// Check a pair with the default sample size and mismatch cap
pub fn validate_pair<P1: AsRef<Path>, P2: AsRef<Path>>(
    r1_path: P1,
    r2_path: P2,
    observer: &dyn QcObserver,
) -> Result<PairValidationResult> {
    PairChecker::default().validate_pair(r1_path, r2_path, observer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn mate_file(ids: &[String], mate: u8) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for id in ids {
            write!(file, "@{}/{}\nACGT\n+\nIIII\n", id, mate).unwrap();
        }
        file
    }

    fn ids(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("SRR1.{}", i)).collect()
    }

    #[test]
    fn test_base_read_id_strips_prefix_and_mate_suffix() {
        assert_eq!(base_read_id("@SRR1.1/1"), "SRR1.1");
        assert_eq!(base_read_id("@SRR1.1/2"), "SRR1.1");
        assert_eq!(base_read_id("@frag7.2"), "frag7");
        assert_eq!(base_read_id("@SRR1.1 extra/2\r"), "SRR1.1 extra");
        assert_eq!(base_read_id("plain"), "plain");
    }

    #[test]
    fn test_matching_mates_are_paired() {
        let r1 = mate_file(&ids(0..5), 1);
        let r2 = mate_file(&ids(0..5), 2);
        let result = validate_pair(r1.path(), r2.path(), &NoopObserver).unwrap();
        assert!(result.paired);
        assert_eq!(result.r1_reads, 5);
        assert_eq!(result.r2_reads, 5);
        assert!(result.mismatches.is_empty());
    }

    #[test]
    fn test_count_mismatch_short_circuits() {
        let r1 = mate_file(&ids(0..10), 1);
        let r2 = mate_file(&ids(100..111), 2);
        let result = validate_pair(r1.path(), r2.path(), &NoopObserver).unwrap();
        assert!(!result.paired);
        assert_eq!(result.r1_reads, 10);
        assert_eq!(result.r2_reads, 11);
        assert!(result.mismatches.is_empty());
    }

    #[test]
    fn test_header_mismatches_are_described_and_capped() {
        let r1 = mate_file(&ids(0..20), 1);
        let r2 = mate_file(&ids(100..120), 2);
        let result = validate_pair(r1.path(), r2.path(), &NoopObserver).unwrap();
        assert!(!result.paired);
        assert_eq!(result.mismatches.len(), MAX_PAIR_MISMATCHES);
        assert_eq!(result.mismatches[0], "SRR1.0 vs SRR1.100");
    }

    #[test]
    fn test_only_leading_sample_is_compared() {
        let mut r2_ids = ids(0..150);
        r2_ids[120] = "other".to_string();
        let r1 = mate_file(&ids(0..150), 1);
        let r2 = mate_file(&r2_ids, 2);

        let result = validate_pair(r1.path(), r2.path(), &NoopObserver).unwrap();
        assert!(result.paired);

        let result = PairChecker::new(150, MAX_PAIR_MISMATCHES)
            .validate_pair(r1.path(), r2.path(), &NoopObserver)
            .unwrap();
        assert!(!result.paired);
        assert_eq!(result.mismatches, vec!["SRR1.120 vs other".to_string()]);
    }

    #[test]
    fn test_sample_size_from_config() {
        // mismatch only at index 3, outside a two-pair sample
        let r1_ids = ids(0..5);
        let mut r2_ids = ids(0..5);
        r2_ids[3] = "SRR9.9".to_string();
        let r1 = mate_file(&r1_ids, 1);
        let r2 = mate_file(&r2_ids, 2);

        let config = QcConfig {
            pair_sample_size: 2,
            ..QcConfig::default()
        };
        let checker = PairChecker::from_config(&config);
        assert_eq!(checker.sample_size, 2);
        let result = checker
            .validate_pair(r1.path(), r2.path(), &NoopObserver)
            .unwrap();
        assert!(result.paired);

        let result = PairChecker::from_config(&QcConfig::default())
            .validate_pair(r1.path(), r2.path(), &NoopObserver)
            .unwrap();
        assert!(!result.paired);
        assert_eq!(result.mismatches, vec!["SRR1.3 vs SRR9.9".to_string()]);
    }

    #[test]
    fn test_partial_record_is_a_count_error() {
        let r1 = mate_file(&ids(0..2), 1);
        let mut r2 = mate_file(&ids(0..1), 2);
        write!(r2, "@SRR1.1/2\nACGT\n").unwrap();
        let err = validate_pair(r1.path(), r2.path(), &NoopObserver).unwrap_err();
        assert!(matches!(err, QcError::LineCount { lines: 6, .. }));
    }

    #[test]
    fn test_missing_mate_is_not_found() {
        let r1 = mate_file(&ids(0..2), 1);
        let err = validate_pair(r1.path(), "missing_R2.fastq", &NoopObserver).unwrap_err();
        assert!(matches!(err, QcError::NotFound { .. }));
    }
}
