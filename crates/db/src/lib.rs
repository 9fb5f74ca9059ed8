//! Ordered key-value tables for bookswap entities.
//!
//! [`Table`] is the storage seam: handlers only ever see `Arc<dyn Table<V>>`. [`Store`] hands
//! out either [`MemoryTable`]s or durable [`FileTable`]s depending on configuration.

pub mod error;
pub mod file;
pub mod memory;
pub mod store;
pub mod table;

pub use error::{StorageError, StorageResult};
pub use file::FileTable;
pub use memory::MemoryTable;
pub use store::Store;
pub use table::Table;
