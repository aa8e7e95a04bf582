//! First-run setup

use crate::config::paths::LedgerPaths;
use crate::config::settings::Settings;
use crate::error::LedgerError;

/// Create the directory layout and a default `config.json`
///
/// Existing settings are left untouched; data files are created lazily on
/// first save.
pub fn initialize_storage(paths: &LedgerPaths) -> Result<Settings, LedgerError> {
    paths.ensure_directories()?;

    let settings = Settings::load_or_create(paths)?;
    if !paths.is_initialized() {
        settings.save(paths)?;
        tracing::info!(base_dir = %paths.base_dir().display(), "initialized data directory");
    }

    Ok(settings)
}
