use std::{env, path::PathBuf};

use crate::encoding::TextRecovery;

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` layers environment variables (prefix `LYRA__`) over an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("LYRA")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.poll_interval_ms == 0 {
            return Err("audio.poll_interval_ms must be >= 1".to_string());
        }
        if self.audio.bind_strategies.is_empty() {
            return Err("audio.bind_strategies must name at least one strategy".to_string());
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(format!("audio.volume must be within 0..1, got {}", self.audio.volume));
        }
        TextRecovery::from_settings(&self.recovery)?;
        Ok(())
    }
}

/// Resolve the config path from `LYRA_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("LYRA_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/lyra/config.toml`
/// or `~/.config/lyra/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("lyra").join("config.toml"))
}
