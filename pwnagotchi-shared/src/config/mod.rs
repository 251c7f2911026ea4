#![allow(clippy::missing_errors_doc)]

mod bettercap;
mod debug;
mod log;
mod plugins;

use std::{fmt::Display, path::Path, sync::OnceLock};

pub use bettercap::BettercapConfig;
pub use debug::DebugConfig;
pub use log::LogConfig;
pub use plugins::{GridConfig, PluginsConfig, WebGpsMapConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
  pub bettercap: BettercapConfig,
  pub plugins: PluginsConfig,
  pub log: LogConfig,
  pub debug: DebugConfig,
}

impl Display for Config {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", toml::to_string(self).unwrap_or_default())
  }
}

impl Config {
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
    let config_str =
      std::fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {e}"))?;
    Self::parse(&config_str)
  }

  pub fn parse(config_str: &str) -> Result<Self, String> {
    toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}"))
  }

  pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
    let config_str =
      toml::to_string(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
    std::fs::write(path, config_str).map_err(|e| format!("Failed to write config file: {e}"))?;
    Ok(())
  }
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn init_config<P: AsRef<Path>>(path: P) {
  let config = Config::load(path).unwrap_or_default();
  let _ = CONFIG.set(config);
}

/// Returns a reference to the global configuration, or the defaults when
/// `init_config` was never called.
pub fn config() -> &'static Config {
  CONFIG.get_or_init(Config::default)
}
