use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::models::{HistoryRecord, HISTORY_HEADER};
use crate::Result;

/// Append-only CSV log of successful checks. Prior rows are never rewritten.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes the header first when the log is new or empty.
    pub fn append(&self, record: &HistoryRecord) -> Result<()> {
        let size = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if size == 0 {
            writer.write_record(HISTORY_HEADER)?;
        }
        writer.serialize(record)?;
        writer.flush()?;

        tracing::debug!("Appended history row for '{}' to {}", record.name, self.path.display());
        Ok(())
    }

    /// The most recent `limit` rows, optionally for one product name, oldest
    /// first. A missing log reads as empty.
    pub fn recent(&self, name: Option<&str>, limit: usize) -> Result<Vec<HistoryRecord>> {
        if !self.exists() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new().from_path(&self.path)?;
        let mut window = VecDeque::with_capacity(limit);

        for row in reader.deserialize::<HistoryRecord>() {
            let record = row?;
            if name.is_some_and(|n| n != record.name) {
                continue;
            }
            if window.len() == limit {
                window.pop_front();
            }
            window.push_back(record);
        }

        Ok(window.into_iter().collect())
    }
}
