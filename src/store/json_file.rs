use crate::core::history::{ConversionRecord, HistoryError, HistoryStore};
use crate::core::recover::recover;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// History persisted as a pretty-printed JSON array.
///
/// Every append rewrites the whole file through a sibling temp file, so
/// the target is either the previous content or the new content.
pub struct JsonFileHistory {
    path: PathBuf,
}

impl JsonFileHistory {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<ConversionRecord>> {
        if !self.path.exists() {
            debug!("No history file at {}", self.path.display());
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    fn write(&self, records: &[ConversionRecord]) -> Result<(), HistoryError> {
        if let Some(bad) = records.iter().find(|r| !r.is_finite()) {
            return Err(HistoryError::NonFinite {
                amount: bad.amount,
                from: bad.from_currency.clone(),
                to: bad.to_currency.clone(),
                result: bad.result,
            });
        }
        let json = serde_json::to_string_pretty(records)?;
        let write_err = |source| HistoryError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).map_err(write_err)?;
        Ok(())
    }
}

impl HistoryStore for JsonFileHistory {
    fn append(&self, record: ConversionRecord) -> Result<(), HistoryError> {
        let mut records = self.load_all();
        records.push(record);
        self.write(&records)?;
        debug!(count = records.len(), "Saved history to {}", self.path.display());
        Ok(())
    }

    fn load_all(&self) -> Vec<ConversionRecord> {
        // `{:#}` keeps the context chain in the diagnostic
        recover(self.read().map_err(|e| format!("{e:#}")), "history").into_value()
    }
}
