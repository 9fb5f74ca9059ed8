pub mod books;
pub mod collection;
pub mod feedback;
pub mod swap_requests;
pub mod users;

use bookswap_db::{StorageResult, Store};
use bookswap_kernel::{Capabilities, ModuleRegistry};

/// Register every entity module, opening its table from `store`
pub fn register_all(
    registry: &mut ModuleRegistry,
    store: &Store,
    caps: &Capabilities,
) -> StorageResult<()> {
    registry.register(users::create_module(store, caps)?);
    registry.register(books::create_module(store, caps)?);
    registry.register(swap_requests::create_module(store, caps)?);
    registry.register(feedback::create_module(store, caps)?);
    Ok(())
}
