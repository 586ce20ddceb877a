//! Structural validation of FASTQ files
//!
//! Defects are recorded as data in [`ValidationResult::errors`] rather than
//! raised, so a caller can inspect what is wrong with a partially broken
//! file. Only filesystem failures are returned as errors.

use crate::error::{QcError, Result};
use crate::observer::{report_progress, QcEvent, QcObserver};
use crate::reader::{FastqReader, FastqRecord, RECORD_LINES};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;

/// Scanning stops once more than this many errors have been recorded
pub const MAX_VALIDATION_ERRORS: usize = 10;

const OPERATION: &str = "validation";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub total_reads: u64,
    pub errors: Vec<String>,
    pub file_size_bytes: u64,
}

impl ValidationResult {
    pub fn file_size_mb(&self) -> f64 {
        self.file_size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Structural validator for FASTQ files
pub struct FastqValidator {
    pub max_errors: usize,
}

impl Default for FastqValidator {
    fn default() -> Self {
        Self {
            max_errors: MAX_VALIDATION_ERRORS,
        }
    }
}

struct ScanOutcome {
    total_reads: u64,
    errors: Vec<String>,
    aborted: bool,
}

impl FastqValidator {
    pub fn new(max_errors: usize) -> Self {
        Self { max_errors }
    }

    /// Validate record structure of a FASTQ file
    pub fn validate<P: AsRef<Path>>(
        &self,
        path: P,
        observer: &dyn QcObserver,
    ) -> Result<ValidationResult> {
        let path = path.as_ref();
        observer.on_event(&QcEvent::Started {
            operation: OPERATION,
            path,
        });

        let file_size_bytes = std::fs::metadata(path)
            .map_err(|e| QcError::from_io(path, e))?
            .len();
        let mut reader = FastqReader::from_path(path)?;
        let outcome = self.scan(&mut reader, observer)?;
        if outcome.aborted {
            observer.on_event(&QcEvent::Warning {
                message: format!(
                    "Validation of {} stopped after {} errors",
                    path.display(),
                    outcome.errors.len()
                ),
            });
        }

        let result = ValidationResult {
            valid: outcome.errors.is_empty(),
            total_reads: outcome.total_reads,
            errors: outcome.errors,
            file_size_bytes,
        };

        observer.on_event(&QcEvent::Finished {
            operation: OPERATION,
            path,
            details: format!(
                "{} reads, {} errors, valid={}",
                result.total_reads,
                result.errors.len(),
                result.valid
            ),
        });
        Ok(result)
    }

    fn scan<R: BufRead>(
        &self,
        reader: &mut FastqReader<R>,
        observer: &dyn QcObserver,
    ) -> Result<ScanOutcome> {
        let mut errors = Vec::new();
        let mut total_reads = 0u64;
        let mut aborted = false;

        'records: while let Some(record) = reader.next_record()? {
            let header_line = total_reads * RECORD_LINES + 1;
            for error in record_errors(&record, header_line) {
                errors.push(error);
                if errors.len() > self.max_errors {
                    aborted = true;
                    break 'records;
                }
            }
            total_reads += 1;
            report_progress(observer, OPERATION, total_reads);
        }

        // The line count is unknown once the scan stops early
        if aborted {
            return Ok(ScanOutcome {
                total_reads,
                errors,
                aborted,
            });
        }

        let total_lines = reader.lines_read();
        if total_lines % RECORD_LINES != 0 {
            errors.push(format!(
                "Total line count {} is not divisible by 4 ({} trailing lines)",
                total_lines,
                total_lines % RECORD_LINES
            ));
        }
        if total_reads == 0 && total_lines > 0 {
            errors.push("File is empty or contains no valid reads".to_string());
        }

        Ok(ScanOutcome {
            total_reads,
            errors,
            aborted,
        })
    }
}

/// Every structural problem with one record, in check order
fn record_errors(record: &FastqRecord, header_line: u64) -> Vec<String> {
    let mut errors = Vec::new();

    if !record.header.starts_with('@') {
        errors.push(format!(
            "Line {}: header line does not start with '@'",
            header_line
        ));
    }
    if !record.separator.starts_with('+') {
        errors.push(format!(
            "Line {}: separator line does not start with '+'",
            header_line + 2
        ));
    }
    if record.sequence.len() != record.quality.len() {
        errors.push(format!(
            "Line {}: sequence length ({}) does not match quality length ({})",
            header_line + 1,
            record.sequence.len(),
            record.quality.len()
        ));
    }
    if !record.sequence.iter().all(|&b| is_nucleotide(b)) {
        errors.push(format!(
            "Line {}: invalid nucleotides in sequence",
            header_line + 1
        ));
    }

    errors
}

fn is_nucleotide(base: u8) -> bool {
    matches!(base.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N')
}

/// Validate with the default error cap
pub fn validate<P: AsRef<Path>>(path: P, observer: &dyn QcObserver) -> Result<ValidationResult> {
    FastqValidator::default().validate(path, observer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::testing::RecordingObserver;
    use crate::observer::NoopObserver;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fastq_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const VALID_READ: &str = "@SRR000001.1 ILLUMINA-52179E_0001:1:1:1260:13059/2\n\
        GATTTGGGGTTCAAAGCAGTATCGATCAAATAGTAAATCCATTTGTTCAACTCACAGTTT\n\
        +\n\
        !''*((((***+))%%%++)(%%%%).1***-+*''))**55CCF>>>>>>CCCCCCC65\n";

    #[test]
    fn test_valid_single_read() {
        let file = fastq_file(VALID_READ);
        let result = validate(file.path(), &NoopObserver).unwrap();
        assert!(result.valid);
        assert_eq!(result.total_reads, 1);
        assert!(result.errors.is_empty());
        assert_eq!(result.file_size_bytes, VALID_READ.len() as u64);
    }

    #[test]
    fn test_bad_header_is_tagged_with_line_number() {
        let file = fastq_file(&format!("{}>SRR2\nACGT\n+\nIIII\n", VALID_READ));
        let result = validate(file.path(), &NoopObserver).unwrap();
        assert!(!result.valid);
        assert_eq!(result.total_reads, 2);
        assert_eq!(
            result.errors,
            vec!["Line 5: header line does not start with '@'".to_string()]
        );
    }

    #[test]
    fn test_one_record_can_fail_several_checks() {
        let file = fastq_file("read1\nACGX\n-\nII\n");
        let result = validate(file.path(), &NoopObserver).unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 4);
        assert!(result.errors[1].contains("Line 3"));
        assert!(result.errors[2].contains("sequence length (4)"));
        assert!(result.errors[2].contains("quality length (2)"));
        assert!(result.errors[3].contains("invalid nucleotides"));
    }

    #[test]
    fn test_lowercase_nucleotides_are_accepted() {
        let file = fastq_file("@r1\nacgtnACGTN\n+\nIIIIIIIIII\n");
        let result = validate(file.path(), &NoopObserver).unwrap();
        assert!(result.valid);
    }

    #[test]
    fn test_partial_record_fails_divisibility() {
        let file = fastq_file(&format!("{}@SRR2\nACGT\n", VALID_READ));
        let result = validate(file.path(), &NoopObserver).unwrap();
        assert!(!result.valid);
        assert_eq!(result.total_reads, 1);
        assert!(result.errors.iter().any(|e| e.contains("not divisible by 4")));
    }

    #[test]
    fn test_only_partial_record_reports_no_reads() {
        let file = fastq_file("@r1\nACGT\n+\n");
        let result = validate(file.path(), &NoopObserver).unwrap();
        assert!(!result.valid);
        assert_eq!(result.total_reads, 0);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[1].contains("no valid reads"));
    }

    #[test]
    fn test_empty_file_is_valid() {
        let file = fastq_file("");
        let result = validate(file.path(), &NoopObserver).unwrap();
        assert!(result.valid);
        assert_eq!(result.total_reads, 0);
        assert_eq!(result.file_size_bytes, 0);
    }

    #[test]
    fn test_scan_stops_after_error_cap() {
        let bad = ">r\nACGT\n+\nIIII\n".repeat(15);
        let file = fastq_file(&bad);
        let observer = RecordingObserver::default();
        let result = validate(file.path(), &observer).unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors.len(), MAX_VALIDATION_ERRORS + 1);
        assert_eq!(result.total_reads, MAX_VALIDATION_ERRORS as u64);
        assert!(observer.events().iter().any(|e| e.contains("stopped after")));
    }

    #[test]
    fn test_custom_error_cap() {
        let bad = ">r\nACGT\n+\nIIII\n".repeat(5);
        let file = fastq_file(&bad);
        let result = FastqValidator::new(2).validate(file.path(), &NoopObserver).unwrap();
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.total_reads, 2);
    }

    #[test]
    fn test_missing_file() {
        let err = validate("nonexistent.fastq", &NoopObserver).unwrap_err();
        assert!(matches!(err, QcError::NotFound { .. }));
    }
}
