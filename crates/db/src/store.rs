use std::path::{Path, PathBuf};
use std::sync::Arc;

use bookswap_kernel::settings::{StorageBackend, StorageSettings};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StorageError, StorageResult};
use crate::file::{FileTable, LOG_EXTENSION};
use crate::memory::MemoryTable;
use crate::table::Table;

/// Factory for the tables of one storage backend.
#[derive(Debug, Clone)]
pub struct Store {
    backend: StorageBackend,
    data_dir: PathBuf,
    sync_writes: bool,
    read_only: bool,
}

impl Store {
    /// Prepare the backend described by `settings`, creating the data directory if needed.
    pub fn open(settings: &StorageSettings) -> StorageResult<Self> {
        if settings.backend == StorageBackend::File {
            std::fs::create_dir_all(&settings.data_dir).map_err(|e| {
                StorageError::io("failed to create data directory", &settings.data_dir, e)
            })?;
        }

        tracing::info!(
            backend = ?settings.backend,
            data_dir = %settings.data_dir.display(),
            sync_writes = settings.sync_writes,
            "storage ready"
        );

        Ok(Self {
            backend: settings.backend,
            data_dir: settings.data_dir.clone(),
            sync_writes: settings.sync_writes,
            read_only: false,
        })
    }

    /// Durable tables under `data_dir`, opened for inspection only.
    ///
    /// Nothing is created, repaired or appended, so this is safe to point at a directory a
    /// running server is writing to.
    pub fn open_read_only(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: data_dir.into(),
            sync_writes: false,
            read_only: true,
        }
    }

    /// A store whose tables live only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::new(),
            sync_writes: false,
            read_only: false,
        }
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Open the table called `name`.
    ///
    /// Opening the same durable table twice yields two handles over one log; callers keep a
    /// single handle per table.
    pub fn table<V>(&self, name: &str) -> StorageResult<Arc<dyn Table<V>>>
    where
        V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        validate_name(name)?;

        let table: Arc<dyn Table<V>> = match self.backend {
            StorageBackend::Memory => Arc::new(MemoryTable::new(name)),
            StorageBackend::File if self.read_only => {
                Arc::new(FileTable::open_read_only(&self.data_dir, name)?)
            }
            StorageBackend::File => {
                Arc::new(FileTable::open(&self.data_dir, name, self.sync_writes)?)
            }
        };

        Ok(table)
    }

    /// Names of the durable tables present in the data directory, sorted. Files whose stem
    /// is not a valid table name are skipped.
    pub fn table_names(&self) -> StorageResult<Vec<String>> {
        if self.backend == StorageBackend::Memory {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.data_dir)
            .map_err(|e| StorageError::io("failed to list data directory", &self.data_dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| StorageError::io("failed to list data directory", &self.data_dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) if validate_name(stem).is_ok() => names.push(stem.to_string()),
                _ => tracing::debug!(path = %path.display(), "skipping non-table log file"),
            }
        }
        names.sort();

        Ok(names)
    }
}

fn validate_name(name: &str) -> StorageResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_settings(dir: &Path) -> StorageSettings {
        StorageSettings {
            backend: StorageBackend::File,
            data_dir: dir.join("data"),
            sync_writes: false,
        }
    }

    #[test]
    fn open_creates_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&file_settings(dir.path())).unwrap();
        assert!(store.data_dir().is_dir());
    }

    #[test]
    fn table_names_lists_opened_logs() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&file_settings(dir.path())).unwrap();

        let _books = store.table::<String>("books").unwrap();
        let _users = store.table::<String>("users").unwrap();
        std::fs::write(store.data_dir().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.table_names().unwrap(), vec!["books", "users"]);
    }

    #[test]
    fn table_names_skip_invalid_stems() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&file_settings(dir.path())).unwrap();

        let _users = store.table::<String>("users").unwrap();
        std::fs::write(store.data_dir().join("users.bak.jsonl"), "").unwrap();
        std::fs::write(store.data_dir().join("old copy.jsonl"), "").unwrap();

        assert_eq!(store.table_names().unwrap(), vec!["users"]);
    }

    #[test]
    fn read_only_store_does_not_create_tables() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.jsonl"), "{\"key\":\"u1\",\"value\":1}\n").unwrap();

        let store = Store::open_read_only(dir.path());
        assert_eq!(store.table::<u32>("users").unwrap().values().unwrap(), vec![1]);
        assert!(store.table::<u32>("books").is_err());
        assert_eq!(store.table_names().unwrap(), vec!["users"]);
    }

    #[test]
    fn memory_tables_are_independent() {
        let store = Store::in_memory();
        let first = store.table::<u32>("users").unwrap();
        let second = store.table::<u32>("books").unwrap();

        first.insert("a".into(), 1).unwrap();
        assert!(second.is_empty().unwrap());
        assert!(store.table_names().unwrap().is_empty());
    }

    #[test]
    fn path_like_names_are_rejected() {
        let store = Store::in_memory();
        let err = store.table::<u32>("../etc").err().unwrap();
        assert!(matches!(err, StorageError::InvalidName(_)));
    }
}
