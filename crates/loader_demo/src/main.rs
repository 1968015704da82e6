mod platform;

use std::path::PathBuf;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(platform::settings::DEFAULT_SETTINGS_FILE));
    let settings = platform::settings::load_settings(&settings_path)?;
    platform::logging::initialize(settings.log_destination, settings.level_filter()?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(platform::run_app(settings))
}
