use std::{borrow::Cow, time::Duration};

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct PluginsConfig {
  pub grid: GridConfig,
  pub webgpsmap: WebGpsMapConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GridConfig {
  pub enabled: bool,
  /// Send pwned networks to the grid. Off by default.
  pub report: bool,
  /// Case-insensitive ESSID/BSSID fragments that are never reported.
  pub exclude: Vec<Cow<'static, str>>,
  pub report_interval_ms: u64,
  pub report_file: Cow<'static, str>,
}

impl GridConfig {
  pub const fn report_interval(&self) -> Duration {
    Duration::from_millis(self.report_interval_ms)
  }
}

impl Default for GridConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      report: false,
      exclude: vec![],
      report_interval_ms: 1500,
      report_file: "/root/.api-report.json".into(),
    }
  }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct WebGpsMapConfig {
  pub enabled: bool,
  pub cache_size: usize,
  pub potfiles: Vec<Cow<'static, str>>,
  pub template: Option<Cow<'static, str>>,
}

impl Default for WebGpsMapConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      cache_size: 2048,
      potfiles: vec![
        "onlinehashcrack.cracked.potfile".into(),
        "wpa-sec.cracked.potfile".into(),
      ],
      template: None,
    }
  }
}
