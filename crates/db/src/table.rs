use crate::error::StorageResult;

/// Ordered mapping from string key to record.
///
/// Each call is atomic on its own; nothing spans two calls or two tables.
pub trait Table<V>: Send + Sync {
    /// Table name, used in logs and file names.
    fn name(&self) -> &str;

    /// Store `value` under `key`, returning the value it replaced, if any.
    fn insert(&self, key: String, value: V) -> StorageResult<Option<V>>;

    fn get(&self, key: &str) -> StorageResult<Option<V>>;

    /// Every stored value, in ascending key order.
    fn values(&self) -> StorageResult<Vec<V>>;

    fn len(&self) -> StorageResult<usize> {
        Ok(self.values()?.len())
    }

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}
