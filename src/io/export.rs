//! JSON result store for sweep records.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::SweepError;
use crate::sim::types::{RunResult, SweepResult};

/// Ordered, schema-consistent collection of run records.
///
/// The first record pushed fixes the field set; later records must carry
/// exactly the same top-level keys. Values are stored and written unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultStore {
    records: Vec<RunResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Builds a store from existing records, checking schema consistency.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::SchemaMismatch` for the first inconsistent record.
    pub fn from_records(records: impl IntoIterator<Item = RunResult>) -> Result<Self, SweepError> {
        let mut store = Self::new();
        for r in records {
            store.push(r)?;
        }
        Ok(store)
    }

    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::SchemaMismatch` if `record` has a different key
    /// set from the first record. The store is left unchanged.
    pub fn push(&mut self, record: RunResult) -> Result<(), SweepError> {
        if let Some(first) = self.records.first() {
            let expected: BTreeSet<&str> = first.keys().into_iter().collect();
            let found: BTreeSet<&str> = record.keys().into_iter().collect();
            if expected != found {
                return Err(SweepError::SchemaMismatch {
                    index: self.records.len(),
                    expected: join(&expected),
                    found: join(&found),
                });
            }
        }
        self.records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[RunResult] {
        &self.records
    }

    pub fn into_records(self) -> SweepResult {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes the records as a JSON array to any writer.
    ///
    /// An empty store writes `[]`.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::Json` if encoding or writing fails.
    pub fn write_json(&self, writer: impl Write) -> Result<(), SweepError> {
        serde_json::to_writer_pretty(writer, &self.records)?;
        Ok(())
    }

    /// Writes the records to `path` in one step.
    ///
    /// The document is written to a sibling temporary file which is then
    /// renamed over `path`, so readers never see a partial file.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::Io` if the file cannot be written or renamed.
    pub fn export_json(&self, path: &Path) -> Result<(), SweepError> {
        let mut body = Vec::new();
        self.write_json(&mut body)?;
        body.push(b'\n');
        atomic_write_bytes(path, &body).map_err(|e| SweepError::io(path, e))?;
        tracing::info!(path = %path.display(), records = self.len(), "results written");
        Ok(())
    }
}

/// Parses a results document back into records.
///
/// # Errors
///
/// Returns `SweepError::Json` for malformed documents and
/// `SweepError::SchemaMismatch` if records disagree on their fields.
pub fn read_json(reader: impl Read) -> Result<SweepResult, SweepError> {
    let records: Vec<RunResult> = serde_json::from_reader(reader)?;
    Ok(ResultStore::from_records(records)?.into_records())
}

/// Reads a results document from disk.
///
/// # Errors
///
/// Returns `SweepError::Io` if the file cannot be opened, otherwise as [`read_json`].
pub fn load_json(path: &Path) -> Result<SweepResult, SweepError> {
    let file = File::open(path).map_err(|e| SweepError::io(path, e))?;
    read_json(BufReader::new(file))
}

fn atomic_write_bytes(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = temp_path_for(path);
    let result = fs::write(&temp_path, content).and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn join(keys: &BTreeSet<&str>) -> String {
    keys.iter().copied().collect::<Vec<_>>().join(", ")
}
