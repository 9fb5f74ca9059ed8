//! Durable table engine.
//!
//! Every table is an append-only JSON-lines log at `<data_dir>/<name>.jsonl`, one
//! `{"key": .., "value": ..}` record per insert. Opening a table replays the log into an
//! ordered map; a later record for a key replaces an earlier one. A write is appended (and
//! optionally fsynced) before it becomes visible to readers.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};
use crate::table::Table;

pub(crate) const LOG_EXTENSION: &str = "jsonl";

#[derive(Serialize)]
struct RecordRef<'a, V> {
    key: &'a str,
    value: &'a V,
}

#[derive(Deserialize)]
struct Record<V> {
    key: String,
    value: V,
}

/// Fix-up the log tail needs after replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repair {
    /// The last record is complete but lacks its newline.
    Terminate,
    /// The last record is torn; cut the log back to `len` bytes.
    Truncate { len: u64, line: usize },
}

struct Inner<V> {
    rows: BTreeMap<String, V>,
    /// `None` for read-only handles.
    log: Option<File>,
    /// Length of the log as of the last successful append.
    end: u64,
}

/// Table persisted as a JSON-lines log.
pub struct FileTable<V> {
    name: String,
    path: PathBuf,
    sync_writes: bool,
    inner: Mutex<Inner<V>>,
}

impl<V> FileTable<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Open (or create) the table `name` inside `data_dir` and replay its log.
    ///
    /// A torn trailing record is cut off the log and a complete but unterminated one gets
    /// its newline, so later appends start on a fresh line.
    pub fn open(data_dir: &Path, name: &str, sync_writes: bool) -> StorageResult<Self> {
        let path = log_path(data_dir, name);

        let mut log = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| StorageError::io("failed to open table log", &path, e))?;

        let content = read_log(&mut log, &path)?;
        let (rows, repair) = Self::replay(name, &content)?;

        match repair {
            Some(Repair::Terminate) => log
                .write_all(b"\n")
                .map_err(|e| StorageError::io("failed to repair table log", &path, e))?,
            Some(Repair::Truncate { len, line }) => {
                tracing::warn!(table = name, line, "discarding torn trailing record");
                log.set_len(len)
                    .map_err(|e| StorageError::io("failed to truncate table log", &path, e))?;
            }
            None => {}
        }

        let end = log
            .metadata()
            .map_err(|e| StorageError::io("failed to inspect table log", &path, e))?
            .len();

        tracing::debug!(
            table = name,
            path = %path.display(),
            rows = rows.len(),
            "table opened"
        );

        Ok(Self {
            name: name.to_string(),
            path,
            sync_writes,
            inner: Mutex::new(Inner {
                rows,
                log: Some(log),
                end,
            }),
        })
    }

    /// Replay an existing log without touching it. Inserts fail with
    /// [`StorageError::ReadOnly`].
    ///
    /// A torn trailing record is skipped.
    pub fn open_read_only(data_dir: &Path, name: &str) -> StorageResult<Self> {
        let path = log_path(data_dir, name);

        let mut log = OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(|e| StorageError::io("failed to open table log", &path, e))?;

        let content = read_log(&mut log, &path)?;
        let (rows, repair) = Self::replay(name, &content)?;
        if let Some(Repair::Truncate { line, .. }) = repair {
            tracing::debug!(table = name, line, "skipping unterminated trailing record");
        }

        Ok(Self {
            name: name.to_string(),
            path,
            sync_writes: false,
            inner: Mutex::new(Inner {
                rows,
                log: None,
                end: content.len() as u64,
            }),
        })
    }

    fn replay(name: &str, content: &[u8]) -> StorageResult<(BTreeMap<String, V>, Option<Repair>)> {
        let mut rows = BTreeMap::new();
        let mut repair = None;
        let mut offset = 0usize;

        for (index, segment) in content.split_inclusive(|byte| *byte == b'\n').enumerate() {
            let line_no = index + 1;
            let terminated = segment.ends_with(b"\n");
            let line = segment.strip_suffix(b"\n").unwrap_or(segment);
            let line = line.strip_suffix(b"\r").unwrap_or(line);

            if line.iter().all(u8::is_ascii_whitespace) {
                offset += segment.len();
                continue;
            }

            // Invalid UTF-8 surfaces as a parse error here, like any other damage.
            match serde_json::from_slice::<Record<V>>(line) {
                Ok(record) => {
                    rows.insert(record.key, record.value);
                    if !terminated {
                        repair = Some(Repair::Terminate);
                    }
                }
                Err(_) if !terminated => {
                    repair = Some(Repair::Truncate {
                        len: offset as u64,
                        line: line_no,
                    });
                }
                Err(source) => {
                    return Err(StorageError::Corrupt {
                        table: name.to_string(),
                        line: line_no,
                        source,
                    });
                }
            }

            offset += segment.len();
        }

        Ok((rows, repair))
    }

    /// Location of the backing log.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn log_path(data_dir: &Path, name: &str) -> PathBuf {
    data_dir.join(format!("{}.{}", name, LOG_EXTENSION))
}

fn read_log(log: &mut File, path: &Path) -> StorageResult<Vec<u8>> {
    let mut content = Vec::new();
    log.read_to_end(&mut content)
        .map_err(|e| StorageError::io("failed to read table log", path, e))?;
    Ok(content)
}

impl<V> FileTable<V> {
    /// Append one encoded record. On failure the log is cut back to its last good length,
    /// so a partial write never merges with the next record.
    fn append(&self, log: &mut File, end: &mut u64, line: &[u8]) -> StorageResult<()> {
        let len = log
            .metadata()
            .map_err(|e| StorageError::io("failed to inspect table log", &self.path, e))?
            .len();
        if len != *end {
            tracing::warn!(
                table = %self.name,
                expected = *end,
                found = len,
                "discarding partial write at log tail"
            );
            log.set_len(*end)
                .map_err(|e| StorageError::io("failed to truncate table log", &self.path, e))?;
        }

        let written = log
            .write_all(line)
            .map_err(|e| StorageError::io("failed to append to table log", &self.path, e))
            .and_then(|()| {
                if self.sync_writes {
                    log.sync_data()
                        .map_err(|e| StorageError::io("failed to sync table log", &self.path, e))
                } else {
                    Ok(())
                }
            });

        match written {
            Ok(()) => {
                *end += line.len() as u64;
                Ok(())
            }
            Err(err) => {
                // A failed rollback is retried by the length check on the next append.
                if let Err(rollback) = log.set_len(*end) {
                    tracing::error!(
                        table = %self.name,
                        error = %rollback,
                        "failed to roll back partial append"
                    );
                }
                Err(err)
            }
        }
    }
}

impl<V> Table<V> for FileTable<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self, key: String, value: V) -> StorageResult<Option<V>> {
        let mut line = serde_json::to_string(&RecordRef {
            key: &key,
            value: &value,
        })
        .map_err(|source| StorageError::Encode {
            table: self.name.clone(),
            source,
        })?;
        line.push('\n');

        let mut guard = self
            .inner
            .lock()
            .map_err(|_| StorageError::poisoned(&self.name))?;
        let inner = &mut *guard;

        let log = inner.log.as_mut().ok_or_else(|| StorageError::ReadOnly {
            table: self.name.clone(),
        })?;
        self.append(log, &mut inner.end, line.as_bytes())?;

        Ok(inner.rows.insert(key, value))
    }

    fn get(&self, key: &str) -> StorageResult<Option<V>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| StorageError::poisoned(&self.name))?;
        Ok(inner.rows.get(key).cloned())
    }

    fn values(&self) -> StorageResult<Vec<V>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| StorageError::poisoned(&self.name))?;
        Ok(inner.rows.values().cloned().collect())
    }

    fn len(&self) -> StorageResult<usize> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| StorageError::poisoned(&self.name))?;
        Ok(inner.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn inserts_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let table: FileTable<Value> = FileTable::open(dir.path(), "users", true).unwrap();
            table.insert("b".into(), json!({"name": "Bo"})).unwrap();
            table.insert("a".into(), json!({"name": "Ada"})).unwrap();
        }

        let table: FileTable<Value> = FileTable::open(dir.path(), "users", true).unwrap();
        assert_eq!(
            table.values().unwrap(),
            vec![json!({"name": "Ada"}), json!({"name": "Bo"})]
        );
        assert_eq!(table.get("b").unwrap(), Some(json!({"name": "Bo"})));
    }

    #[test]
    fn later_record_wins_on_replay() {
        let dir = tempfile::tempdir().unwrap();

        {
            let table: FileTable<u32> = FileTable::open(dir.path(), "counts", false).unwrap();
            table.insert("k".into(), 1).unwrap();
            assert_eq!(table.insert("k".into(), 2).unwrap(), Some(1));
        }

        let table: FileTable<u32> = FileTable::open(dir.path(), "counts", false).unwrap();
        assert_eq!(table.values().unwrap(), vec![2]);
    }

    #[test]
    fn torn_trailing_record_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.jsonl");
        std::fs::write(&path, "{\"key\":\"a\",\"value\":1}\n{\"key\":\"b\",\"val").unwrap();

        {
            let table: FileTable<u32> = FileTable::open(dir.path(), "books", true).unwrap();
            assert_eq!(table.values().unwrap(), vec![1]);
            table.insert("c".into(), 3).unwrap();
        }

        let table: FileTable<u32> = FileTable::open(dir.path(), "books", true).unwrap();
        assert_eq!(table.values().unwrap(), vec![1, 3]);
    }

    #[test]
    fn record_torn_inside_multibyte_character_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.jsonl");
        let mut bytes = b"{\"key\":\"a\",\"value\":\"x\"}\n{\"key\":\"b\",\"value\":\"Jos".to_vec();
        bytes.push(0xC3);
        std::fs::write(&path, bytes).unwrap();

        {
            let table: FileTable<String> = FileTable::open(dir.path(), "users", true).unwrap();
            assert_eq!(table.values().unwrap(), vec!["x".to_string()]);
            table.insert("c".into(), "José".into()).unwrap();
        }

        let table: FileTable<String> = FileTable::open(dir.path(), "users", true).unwrap();
        assert_eq!(
            table.values().unwrap(),
            vec!["x".to_string(), "José".to_string()]
        );
    }

    #[test]
    fn invalid_utf8_interior_record_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.jsonl");
        let mut bytes = b"{\"key\":\"a\",\"value\":\"".to_vec();
        bytes.extend_from_slice(&[0xC3, b'"', b'}', b'\n']);
        bytes.extend_from_slice(b"{\"key\":\"b\",\"value\":\"y\"}\n");
        std::fs::write(&path, bytes).unwrap();

        let err = FileTable::<String>::open(dir.path(), "users", true)
            .err()
            .unwrap();
        assert!(matches!(err, StorageError::Corrupt { line: 1, .. }));
    }

    #[test]
    fn partial_append_is_cut_before_next_insert() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.jsonl");

        {
            let table: FileTable<u32> = FileTable::open(dir.path(), "books", true).unwrap();
            table.insert("a".into(), 1).unwrap();

            // Bytes left behind by an append that failed halfway.
            let mut log = OpenOptions::new().append(true).open(&path).unwrap();
            log.write_all(b"{\"key\":\"b\",\"va").unwrap();
            drop(log);

            table.insert("c".into(), 3).unwrap();
            assert_eq!(table.values().unwrap(), vec![1, 3]);
        }

        let table: FileTable<u32> = FileTable::open(dir.path(), "books", true).unwrap();
        assert_eq!(table.values().unwrap(), vec![1, 3]);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\"key\":\"a\",\"value\":1}\n{\"key\":\"c\",\"value\":3}\n"
        );
    }

    #[test]
    fn read_only_open_leaves_log_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.jsonl");
        let original = concat!(
            "{\"key\":\"b\",\"value\":2}\n",
            "{\"key\":\"a\",\"value\":1}\n",
            "{\"key\":\"c\",\"va",
        );
        std::fs::write(&path, original).unwrap();

        let table: FileTable<u32> = FileTable::open_read_only(dir.path(), "books").unwrap();
        assert_eq!(table.values().unwrap(), vec![1, 2]);

        let err = table.insert("d".into(), 4).err().unwrap();
        assert!(matches!(err, StorageError::ReadOnly { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn read_only_open_requires_existing_log() {
        let dir = tempfile::tempdir().unwrap();

        let err = FileTable::<u32>::open_read_only(dir.path(), "missing")
            .err()
            .unwrap();
        assert!(matches!(err, StorageError::Io { .. }));
        assert!(!dir.path().join("missing.jsonl").exists());
    }

    #[test]
    fn unterminated_complete_record_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.jsonl");
        std::fs::write(&path, "{\"key\":\"a\",\"value\":1}").unwrap();

        {
            let table: FileTable<u32> = FileTable::open(dir.path(), "books", true).unwrap();
            table.insert("b".into(), 2).unwrap();
        }

        let table: FileTable<u32> = FileTable::open(dir.path(), "books", true).unwrap();
        assert_eq!(table.values().unwrap(), vec![1, 2]);
    }

    #[test]
    fn malformed_interior_record_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.jsonl");
        std::fs::write(&path, "not json\n{\"key\":\"a\",\"value\":1}\n").unwrap();

        let err = FileTable::<u32>::open(dir.path(), "books", true)
            .err()
            .unwrap();
        assert!(matches!(err, StorageError::Corrupt { line: 1, .. }));
    }
}
