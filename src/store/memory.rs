use crate::core::history::{ConversionRecord, HistoryError, HistoryStore};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// In-memory history, lost when the process exits
#[derive(Clone, Default)]
pub struct MemoryHistory {
    inner: Arc<Mutex<Vec<ConversionRecord>>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&self, record: ConversionRecord) -> Result<(), HistoryError> {
        let mut records = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        records.push(record);
        debug!(count = records.len(), "History APPEND");
        Ok(())
    }

    fn load_all(&self) -> Vec<ConversionRecord> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
