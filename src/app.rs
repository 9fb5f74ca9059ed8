//! Process bootstrap shared by the `bookswap-app` binary and `bookswap-cli serve`.

use anyhow::Context;
use bookswap_db::Store;
use bookswap_kernel::{settings::Settings, Capabilities, InitCtx, ModuleRegistry};

use crate::modules;

/// Build a registry holding every entity module over `store`.
pub fn build_registry(store: &Store, caps: &Capabilities) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store, caps).context("failed to open entity tables")?;
    Ok(registry)
}

/// Open storage, run the module lifecycle, and serve HTTP until shutdown.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let store = Store::open(&settings.storage).context("failed to open storage")?;
    let registry = build_registry(&store, &Capabilities::system())?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookswap_http::start_server(&registry, &settings).await;

    registry.stop_modules().await?;
    served
}
