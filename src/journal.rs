//! Append-only log of completed conversions.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One completed conversion, as persisted to the log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub date: NaiveDate,
    pub amount: f64,
    pub base_currency: String,
    pub target_currency: String,
    pub converted_amount: f64,
}

/// JSON-file-backed list of conversion records. Appending reads the
/// existing list and rewrites the whole file, so the file always holds a
/// complete, well-formed list.
pub struct ConversionJournal {
    path: PathBuf,
}

impl ConversionJournal {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConversionJournal {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, record: &ConversionRecord) -> Result<()> {
        let mut records = self.read_all()?;
        records.push(record.clone());
        let raw = serde_json::to_string_pretty(&records)?;
        fs::write(&self.path, raw).with_context(|| {
            format!("Failed to write conversion log: {}", self.path.display())
        })?;
        debug!(total = records.len(), "Appended conversion record");
        Ok(())
    }

    /// Returns all persisted records; a missing file is an empty list.
    pub fn read_all(&self) -> Result<Vec<ConversionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path).with_context(|| {
            format!("Failed to read conversion log: {}", self.path.display())
        })?;
        serde_json::from_str(&raw).with_context(|| {
            format!("Failed to parse conversion log: {}", self.path.display())
        })
    }
}
