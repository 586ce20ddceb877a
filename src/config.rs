//! QC run configuration
//!
//! Everything organism- or lab-specific lives here; the remaining thresholds
//! are named constants in their calculator modules.

use crate::error::{QcError, Result};
use crate::gc::{GcRange, OutOfRangeLabel};
use crate::paired::PAIR_SAMPLE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    /// Expected GC percentage for the sequenced organism
    pub gc_range: GcRange,
    pub out_of_range_label: OutOfRangeLabel,
    /// File extensions (without the dot) picked up in a directory scan
    pub extensions: Vec<String>,
    pub pair_sample_size: u64,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            gc_range: GcRange::BROAD,
            out_of_range_label: OutOfRangeLabel::Warning,
            extensions: vec!["fastq".to_string()],
            pair_sample_size: PAIR_SAMPLE_SIZE,
        }
    }
}

impl QcConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| QcError::from_io(path, e))?;
        let config: QcConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        GcRange::new(self.gc_range.min, self.gc_range.max)?;
        if self.extensions.is_empty() {
            return Err(QcError::InvalidConfig(
                "at least one FASTQ extension is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Case-insensitive extension match
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}
