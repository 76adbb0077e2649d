//! Configuration loading.
//!
//! The engine configuration is layered: the chosen preset first, then the
//! user config file, then an explicit `--config` file, then `AF_*`
//! environment variables (`AF_WEIGHTS__RATE=0.3` sets `weights.rate`).

use std::path::{Path, PathBuf};

use af_core::{FatigueConfig, Preset};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};

/// Loads configuration, optionally from a specific file.
#[expect(
    clippy::result_large_err,
    reason = "figment::Error is large but only returned at startup"
)]
pub fn load_from(preset: Preset, config_path: Option<&Path>) -> Result<FatigueConfig, figment::Error> {
    let mut figment = layered(preset, config_path);
    figment = figment.merge(Env::prefixed("AF_").split("__"));
    figment.extract()
}

fn layered(preset: Preset, config_path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(preset.config()));

    if let Some(config_dir) = dirs_config_path() {
        figment = figment.merge(Toml::file(config_dir.join("config.toml")));
    }

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment
}

/// Returns the platform-specific config directory for af.
///
/// On Linux: `~/.config/af`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("af"))
}
