use anyhow::Context;
use bookswap_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookswap settings")?;
    bookswap_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.storage.backend,
        data_dir = %settings.storage.data_dir.display(),
        "bookswap-app bootstrap starting"
    );

    bookswap_app::app::serve(settings).await
}
