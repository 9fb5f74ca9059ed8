use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::table::Table;

/// Process-lifetime table backed by a `BTreeMap`.
#[derive(Debug)]
pub struct MemoryTable<V> {
    name: String,
    rows: RwLock<BTreeMap<String, V>>,
}

impl<V> MemoryTable<V> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<V> Table<V> for MemoryTable<V>
where
    V: Clone + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self, key: String, value: V) -> StorageResult<Option<V>> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StorageError::poisoned(&self.name))?;
        Ok(rows.insert(key, value))
    }

    fn get(&self, key: &str) -> StorageResult<Option<V>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StorageError::poisoned(&self.name))?;
        Ok(rows.get(key).cloned())
    }

    fn values(&self) -> StorageResult<Vec<V>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StorageError::poisoned(&self.name))?;
        Ok(rows.values().cloned().collect())
    }

    fn len(&self) -> StorageResult<usize> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StorageError::poisoned(&self.name))?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_come_back_in_key_order() {
        let table = MemoryTable::new("letters");
        table.insert("c".into(), 3).unwrap();
        table.insert("a".into(), 1).unwrap();
        table.insert("b".into(), 2).unwrap();

        assert_eq!(table.values().unwrap(), vec![1, 2, 3]);
        assert_eq!(table.len().unwrap(), 3);
    }

    #[test]
    fn insert_overwrites_silently() {
        let table = MemoryTable::new("letters");
        assert_eq!(table.insert("a".into(), 1).unwrap(), None);
        assert_eq!(table.insert("a".into(), 2).unwrap(), Some(1));
        assert_eq!(table.get("a").unwrap(), Some(2));
        assert_eq!(table.len().unwrap(), 1);
    }

    #[test]
    fn get_missing_key_is_none() {
        let table: MemoryTable<u32> = MemoryTable::new("empty");
        assert_eq!(table.get("nope").unwrap(), None);
        assert!(table.is_empty().unwrap());
    }
}
