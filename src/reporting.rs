//! Multi-sample QC reporting module
//!
//! Runs every per-file check over a directory of FASTQ files and merges the
//! results into one summary row per file. A file that cannot be analyzed is
//! reported through the observer and left out; the batch carries on.

use crate::config::QcConfig;
use crate::error::{QcError, Result};
use crate::gc::{GcCalculator, GcStatus};
use crate::nbase::{n_base_fraction, NBaseStatus};
use crate::observer::{QcEvent, QcObserver};
use crate::quality::{QualityAnalyzer, QualityStatus};
use crate::round_to;
use crate::validation::FastqValidator;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const OPERATION: &str = "aggregate";

/// One row of the QC report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileQcSummary {
    pub filename: String,
    pub file_size_mb: f64,
    pub valid: bool,
    pub total_reads: u64,
    pub errors: Vec<String>,
    pub gc_percentage: f64,
    pub gc_status: GcStatus,
    pub mean_quality: f64,
    pub q30_percentage: f64,
    pub quality_status: QualityStatus,
    pub n_percentage: f64,
    pub n_status: NBaseStatus,
    pub overall_pass: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiSampleReport {
    pub samples: Vec<FileQcSummary>,
    pub summary: QcSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QcSummary {
    pub total_samples: usize,
    pub passed_samples: usize,
    pub failed_samples: usize,
    pub pass_rate: f64,
    pub average_quality: f64,
    pub average_gc_content: f64,
}

/// QC reporter for multi-sample analysis
#[derive(Default)]
pub struct QcReporter {
    pub config: QcConfig,
}

impl QcReporter {
    pub fn new(config: QcConfig) -> Self {
        Self { config }
    }

    /// Validate a file, then compute GC, base quality and N-base metrics
    pub fn analyze_file<P: AsRef<Path>>(
        &self,
        path: P,
        observer: &dyn QcObserver,
    ) -> Result<FileQcSummary> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let validation = FastqValidator::default().validate(path, observer)?;
        let gc = GcCalculator::new(self.config.gc_range)
            .with_out_of_range_label(self.config.out_of_range_label)
            .calculate(path, observer)?;
        let quality = QualityAnalyzer::default().analyze_fastq(path, observer)?;
        let n_bases = n_base_fraction(path, observer)?;

        let mut row = FileQcSummary {
            filename,
            file_size_mb: round_to(validation.file_size_mb(), 2),
            valid: validation.valid,
            total_reads: validation.total_reads,
            errors: validation.errors,
            gc_percentage: round_to(gc.gc_percentage, 2),
            gc_status: gc.status,
            mean_quality: round_to(quality.mean_quality, 1),
            q30_percentage: round_to(quality.q30_percentage, 1),
            quality_status: quality.status,
            n_percentage: round_to(n_bases.n_percentage, 2),
            n_status: n_bases.status,
            overall_pass: false,
        };
        row.overall_pass = self.evaluate_sample(&row);
        Ok(row)
    }

    /// Analyze every FASTQ file directly inside `dir`, sorted by filename
    pub fn aggregate_directory<P: AsRef<Path>>(
        &self,
        dir: P,
        observer: &dyn QcObserver,
    ) -> Result<Vec<FileQcSummary>> {
        let dir = dir.as_ref();
        let files = self.fastq_files(dir, observer)?;
        if files.is_empty() {
            observer.on_event(&QcEvent::Warning {
                message: format!("No FASTQ files found in {}", dir.display()),
            });
            return Ok(Vec::new());
        }

        let mut rows = Vec::with_capacity(files.len());
        for file in &files {
            match self.analyze_file(file, observer) {
                Ok(row) => rows.push(row),
                Err(e) => observer.on_event(&QcEvent::Skipped {
                    path: file.as_path(),
                    reason: e.to_string(),
                }),
            }
        }
        rows.sort_by(|a, b| a.filename.cmp(&b.filename));

        observer.on_event(&QcEvent::Finished {
            operation: OPERATION,
            path: dir,
            details: format!(
                "Completed: {} of {} files processed successfully",
                rows.len(),
                files.len()
            ),
        });
        Ok(rows)
    }

    fn fastq_files(&self, dir: &Path, observer: &dyn QcObserver) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(|e| QcError::from_io(dir, e))?;
        Ok(self.select_fastq_paths(
            dir,
            entries.map(|entry| entry.map(|e| e.path())),
            observer,
        ))
    }

    /// Keep matching regular files; unreadable entries are reported and dropped
    fn select_fastq_paths<I>(
        &self,
        dir: &Path,
        entries: I,
        observer: &dyn QcObserver,
    ) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = std::io::Result<PathBuf>>,
    {
        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => {
                    if path.is_file() && self.config.matches_extension(&path) {
                        files.push(path);
                    }
                }
                Err(e) => observer.on_event(&QcEvent::Warning {
                    message: format!("Unreadable entry in {}: {}", dir.display(), e),
                }),
            }
        }
        files.sort();
        files
    }

    /// Generate comprehensive QC report for multiple samples
    pub fn generate_report(&self, sample_reports: Vec<FileQcSummary>) -> MultiSampleReport {
        let total_samples = sample_reports.len();
        let passed_samples = sample_reports.iter().filter(|r| r.overall_pass).count();
        let failed_samples = total_samples - passed_samples;

        let average = |metric: fn(&FileQcSummary) -> f64| {
            if sample_reports.is_empty() {
                0.0
            } else {
                sample_reports.iter().map(metric).sum::<f64>() / total_samples as f64
            }
        };
        let average_quality = average(|r| r.mean_quality);
        let average_gc_content = average(|r| r.gc_percentage);

        let pass_rate = if total_samples > 0 {
            (passed_samples as f64 / total_samples as f64) * 100.0
        } else {
            0.0
        };

        let summary = QcSummary {
            total_samples,
            passed_samples,
            failed_samples,
            pass_rate,
            average_quality,
            average_gc_content,
        };

        MultiSampleReport {
            samples: sample_reports,
            summary,
        }
    }

    /// Export report to JSON
    pub fn export_json<P: AsRef<Path>>(&self, report: &MultiSampleReport, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| QcError::from_io(parent, e))?;
        }
        let json_content = serde_json::to_string_pretty(report)?;
        std::fs::write(path, json_content).map_err(|e| QcError::from_io(path, e))?;
        Ok(())
    }

    /// GC in range, good or better quality, N bases pass
    ///
    /// Structural validity is reported in its own column and does not feed
    /// into the pass decision.
    pub fn evaluate_sample(&self, sample: &FileQcSummary) -> bool {
        sample.gc_status == GcStatus::Valid
            && sample.quality_status.is_acceptable()
            && sample.n_status == NBaseStatus::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::GcRange;
    use crate::observer::testing::RecordingObserver;
    use crate::observer::NoopObserver;
    use tempfile::tempdir;

    const GOOD_READ: &str = "@read1\nGATCGATCGATCGATCGATC\n+\nIIIIIIIIIIIIIIIIIIII\n";

    #[test]
    fn test_reporter_default() {
        let reporter = QcReporter::default();
        assert_eq!(reporter.config.gc_range, GcRange::BROAD);
    }

    #[test]
    fn test_analyze_file_merges_metrics() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.fastq");
        std::fs::write(&path, GOOD_READ.repeat(4)).unwrap();

        let row = QcReporter::default().analyze_file(&path, &NoopObserver).unwrap();
        assert_eq!(row.filename, "sample.fastq");
        assert!(row.valid);
        assert_eq!(row.total_reads, 4);
        assert_eq!(row.gc_percentage, 50.0);
        assert_eq!(row.gc_status, GcStatus::Valid);
        assert_eq!(row.mean_quality, 40.0);
        assert_eq!(row.quality_status, QualityStatus::Excellent);
        assert_eq!(row.n_status, NBaseStatus::Pass);
        assert_eq!(row.file_size_mb, 0.0);
        assert!(row.overall_pass);
    }

    #[test]
    fn test_overall_pass_ignores_structural_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fasta_header.fastq");
        std::fs::write(&path, GOOD_READ.replacen('@', ">", 1)).unwrap();

        let row = QcReporter::default().analyze_file(&path, &NoopObserver).unwrap();
        assert!(!row.valid);
        assert_eq!(row.gc_status, GcStatus::Valid);
        assert_eq!(row.quality_status, QualityStatus::Excellent);
        assert_eq!(row.n_status, NBaseStatus::Pass);
        assert!(row.overall_pass);
    }

    #[test]
    fn test_aggregate_skips_bad_files_and_sorts() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.fastq"), GOOD_READ).unwrap();
        std::fs::write(dir.path().join("a.fastq"), GOOD_READ.repeat(2)).unwrap();
        std::fs::write(dir.path().join("all_n.fastq"), "@r\nNNNN\n+\nIIII\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a fastq").unwrap();

        let observer = RecordingObserver::default();
        let rows = QcReporter::default()
            .aggregate_directory(dir.path(), &observer)
            .unwrap();

        let names: Vec<_> = rows.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["a.fastq", "b.fastq"]);
        assert!(observer
            .events()
            .iter()
            .any(|e| e.starts_with("Skipped") && e.contains("all_n.fastq")));
    }

    #[test]
    fn test_aggregate_missing_directory() {
        let err = QcReporter::default()
            .aggregate_directory("no/such/dir", &NoopObserver)
            .unwrap_err();
        assert!(matches!(err, QcError::NotFound { .. }));
    }

    #[test]
    fn test_unreadable_entries_are_reported() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("a.fastq");
        std::fs::write(&good, GOOD_READ).unwrap();

        let entries = vec![
            Ok(good.clone()),
            Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied)),
        ];
        let observer = RecordingObserver::default();
        let files = QcReporter::default().select_fastq_paths(dir.path(), entries, &observer);

        assert_eq!(files, vec![good]);
        assert!(observer
            .events()
            .iter()
            .any(|e| e.starts_with("Warning") && e.contains("Unreadable entry")));
    }

    #[test]
    fn test_export_json_write_failure_is_qc_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "a file, not a directory").unwrap();

        let reporter = QcReporter::default();
        let report = reporter.generate_report(Vec::new());
        let err = reporter
            .export_json(&report, blocker.join("qc.json"))
            .unwrap_err();
        assert!(err.is_filesystem());
    }

    #[test]
    fn test_empty_report_has_zero_pass_rate() {
        let report = QcReporter::default().generate_report(Vec::new());
        assert_eq!(report.summary.total_samples, 0);
        assert_eq!(report.summary.pass_rate, 0.0);
        assert_eq!(report.summary.average_quality, 0.0);
    }

    #[test]
    fn test_export_json_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.fastq"), GOOD_READ).unwrap();
        let reporter = QcReporter::default();
        let rows = reporter.aggregate_directory(dir.path(), &NoopObserver).unwrap();
        let report = reporter.generate_report(rows);
        assert_eq!(report.summary.passed_samples, 1);
        assert_eq!(report.summary.pass_rate, 100.0);

        let out = dir.path().join("reports").join("qc.json");
        reporter.export_json(&report, &out).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["samples"][0]["filename"], "a.fastq");
        assert_eq!(json["samples"][0]["gc_status"], "valid");
    }
}
