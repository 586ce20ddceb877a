//! Ambiguous base (N) fraction

use crate::error::{QcError, Result};
use crate::observer::{report_progress, QcEvent, QcObserver};
use crate::reader::{LineReader, RECORD_LINES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// N percentages below this pass
pub const N_PASS_BELOW_PERCENT: f64 = 5.0;
/// N percentages below this (and at least the pass bound) warn
pub const N_WARNING_BELOW_PERCENT: f64 = 10.0;

const OPERATION: &str = "n_bases";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NBaseStatus {
    Pass,
    Warning,
    Fail,
}

impl NBaseStatus {
    pub fn classify(n_percentage: f64) -> Self {
        if n_percentage < N_PASS_BELOW_PERCENT {
            NBaseStatus::Pass
        } else if n_percentage < N_WARNING_BELOW_PERCENT {
            NBaseStatus::Warning
        } else {
            NBaseStatus::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NBaseStatus::Pass => "pass",
            NBaseStatus::Warning => "warning",
            NBaseStatus::Fail => "fail",
        }
    }
}

impl fmt::Display for NBaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NBaseResult {
    pub total_n: u64,
    pub total_bases: u64,
    pub n_percentage: f64,
    pub status: NBaseStatus,
}

/// Count N bases across every sequence line of a FASTQ file
pub fn n_base_fraction<P: AsRef<Path>>(path: P, observer: &dyn QcObserver) -> Result<NBaseResult> {
    let path = path.as_ref();
    observer.on_event(&QcEvent::Started {
        operation: OPERATION,
        path,
    });

    let mut lines = LineReader::from_path(path)?;
    let mut total_n = 0u64;
    let mut total_bases = 0u64;
    let mut sequences = 0u64;
    let mut index = 0u64;

    while let Some(line) = lines.next_line()? {
        if index % RECORD_LINES == 1 {
            total_n += line.iter().filter(|b| b.eq_ignore_ascii_case(&b'N')).count() as u64;
            total_bases += line.len() as u64;
            sequences += 1;
            report_progress(observer, OPERATION, sequences);
        }
        index += 1;
    }

    if total_bases == 0 {
        return Err(QcError::NoUsableBases {
            path: path.to_path_buf(),
            metric: OPERATION,
        });
    }

    let n_percentage = total_n as f64 * 100.0 / total_bases as f64;
    let status = NBaseStatus::classify(n_percentage);

    observer.on_event(&QcEvent::Finished {
        operation: OPERATION,
        path,
        details: format!("N bases: {} ({:.2}%), status {}", total_n, n_percentage, status),
    });

    Ok(NBaseResult {
        total_n,
        total_bases,
        n_percentage,
        status,
    })
}
