use std::path::PathBuf;

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failures raised by table engines.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{context}: {path}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode record for table '{table}'")]
    Encode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("table '{table}' is corrupt at line {line}")]
    Corrupt {
        table: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("table '{table}' lock was poisoned by a panicking writer")]
    Poisoned { table: String },

    #[error("table '{table}' was opened read-only")]
    ReadOnly { table: String },

    #[error("invalid table name '{0}'")]
    InvalidName(String),
}

impl StorageError {
    pub(crate) fn io(
        context: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn poisoned(table: &str) -> Self {
        Self::Poisoned {
            table: table.to_string(),
        }
    }
}
