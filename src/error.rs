//! Error types for the sweep pipeline.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"settings.batches"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Canonical error type for every stage of a sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    /// One or more configuration fields failed validation.
    #[error("config error: {}", join_config_errors(.0))]
    Config(Vec<ConfigError>),
    /// Two fields of a record would share a name.
    #[error("field \"{name}\" would appear more than once in each record")]
    DuplicateField { name: String },
    /// A requested tally was not produced by the simulation.
    #[error("run {run}: tally \"{name}\" not found in simulation output")]
    MissingTally { run: usize, name: String },
    /// The backend reported a tally whose bins cannot be aggregated.
    #[error("tally \"{name}\" is malformed: {reason}")]
    MalformedTally { name: String, reason: String },
    /// The simulation backend failed to complete a run.
    #[error("run {run}: simulation backend failed: {message}")]
    Backend { run: usize, message: String },
    /// A record's key set differs from the first record of the sweep.
    #[error("record {index} has fields [{found}], expected [{expected}]")]
    SchemaMismatch {
        index: usize,
        expected: String,
        found: String,
    },
    /// A series column was requested that a record does not carry.
    #[error("record {index} has no numeric field \"{field}\"")]
    MissingField { index: usize, field: String },
    #[error("i/o error at \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl SweepError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ConfigError> for SweepError {
    fn from(err: ConfigError) -> Self {
        Self::Config(vec![err])
    }
}

fn join_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
