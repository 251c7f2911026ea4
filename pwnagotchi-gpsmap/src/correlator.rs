use std::{
  collections::{BTreeMap, HashSet},
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use pwnagotchi_shared::{config::WebGpsMapConfig, logger::LOGGER, utils::general::list_captures};
use serde::Serialize;

use crate::{
  cache::{CacheStats, PositionCache},
  capture::{self, CaptureArtifact},
  error::PositionError,
  password::PasswordResolver,
  position::{PositionFormat, PositionRecord},
};

/// One handshake with a known position, as served to the map page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionEntry {
  pub ssid: String,
  pub mac: String,
  #[serde(rename = "type")]
  pub format: PositionFormat,
  pub lng: f64,
  pub lat: f64,
  pub acc: Option<f64>,
  pub ts_first: i64,
  pub ts_last: i64,
  #[serde(rename = "pass", skip_serializing_if = "Option::is_none")]
  pub password: Option<String>,
}

/// Keyed by `<ssid or "unknown">_<mac>`.
pub type Positions = BTreeMap<String, PositionEntry>;

/// Walks a handshake directory and pairs every capture with its position
/// sidecar and cracked password.
#[derive(Debug)]
pub struct PositionCorrelator {
  cache: PositionCache,
  passwords: PasswordResolver,
  already_sent: HashSet<PathBuf>,
  skipped: Vec<PathBuf>,
}

impl Default for PositionCorrelator {
  fn default() -> Self {
    Self::new(PositionCache::default(), PasswordResolver::default())
  }
}

impl PositionCorrelator {
  pub fn new(cache: PositionCache, passwords: PasswordResolver) -> Self {
    Self { cache, passwords, already_sent: HashSet::new(), skipped: Vec::new() }
  }

  pub fn from_config(config: &WebGpsMapConfig) -> Self {
    Self::new(
      PositionCache::new(config.cache_size),
      PasswordResolver::new(config.potfiles.iter().map(ToString::to_string)),
    )
  }

  /// Sidecars that failed to parse during the last pass.
  pub fn skipped(&self) -> &[PathBuf] {
    &self.skipped
  }

  pub const fn cache_stats(&self) -> CacheStats {
    self.cache.stats()
  }

  /// Forgets which sidecars were already served this session.
  pub fn reset_sent(&mut self) {
    self.already_sent.clear();
  }

  /// Full pass: starts a new session and returns every known position.
  pub fn scan(&mut self, handshake_dir: &Path) -> Result<Positions> {
    self.reset_sent();
    self.load_gps_from_dir(handshake_dir, false)
  }

  /// Only positions whose sidecar was not served since the last full pass.
  pub fn scan_newest(&mut self, handshake_dir: &Path) -> Result<Positions> {
    self.load_gps_from_dir(handshake_dir, true)
  }

  /// Correlates every capture in `handshake_dir`. Files that fail to parse
  /// are recorded in [`Self::skipped`] and never abort the pass.
  ///
  /// # Errors
  /// Returns an error only when the directory itself cannot be listed.
  pub fn load_gps_from_dir(&mut self, handshake_dir: &Path, newest_only: bool) -> Result<Positions> {
    LOGGER.log_info("webgpsmap", &format!("scanning {}", handshake_dir.display()));
    self.skipped.clear();

    let captures = list_captures(handshake_dir)
      .with_context(|| format!("Failed to list {}", handshake_dir.display()))?;

    let mut pairs: Vec<(PathBuf, PathBuf)> = captures
      .iter()
      .filter_map(|pcap| Some((pcap.clone(), find_sidecar(pcap)?)))
      .collect();

    if newest_only {
      pairs.retain(|(_, sidecar)| !self.already_sent.contains(sidecar));
    }

    LOGGER.log_info(
      "webgpsmap",
      &format!(
        "Found {} position-data files from {} handshakes. Fetching positions ...",
        pairs.len(),
        captures.len()
      ),
    );

    let mut positions = Positions::new();
    for (pcap, sidecar) in pairs {
      match self.correlate(&pcap, &sidecar) {
        Ok((key, entry)) => {
          positions.insert(key, entry);
          self.already_sent.insert(sidecar);
        }
        Err(e @ PositionError::MissingCoordinates(_)) => {
          LOGGER.log_debug("webgpsmap", &e.to_string());
        }
        Err(e) => {
          LOGGER.log_error("webgpsmap", &e.to_string());
          self.skipped.push(sidecar);
        }
      }
    }

    LOGGER.log_info("webgpsmap", &format!("loaded {} positions", positions.len()));
    Ok(positions)
  }

  fn correlate(
    &mut self,
    pcap: &Path,
    sidecar: &Path,
  ) -> Result<(String, PositionEntry), PositionError> {
    let record = self.cache.get_or_parse(sidecar)?;
    let (lat, lng) = record.require_coordinates()?;

    let ssid = record.essid.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "unknown".into());
    let mac = capture::format_mac(&record.mac).unwrap_or_else(|| record.mac.clone());

    let ts_first = first_seen(pcap, &record);
    let password = self.passwords.resolve(&record.base(), &record.mac).filter(|p| !p.is_empty());

    let entry = PositionEntry {
      ssid: ssid.clone(),
      mac: mac.clone(),
      format: record.format,
      lng,
      lat,
      acc: record.accuracy,
      ts_first,
      ts_last: record.timestamp_last_seen,
      password,
    };

    Ok((format!("{ssid}_{mac}"), entry))
  }
}

/// Later formats in the scan order replace earlier ones.
fn find_sidecar(pcap: &Path) -> Option<PathBuf> {
  let net_id = capture::network_id(pcap)?;
  LOGGER.log_debug("webgpsmap", &format!("found: {net_id}"));

  let mut found = None;
  for format in PositionFormat::SCAN_ORDER {
    let candidate = pcap.with_file_name(format!("{net_id}{}", format.suffix()));
    if candidate.is_file() {
      found = Some(candidate);
    }
  }

  LOGGER.log_debug("webgpsmap", &format!("using position file {found:?} for {net_id}"));
  found
}

/// Creation time of the capture; the sidecar's last-seen when the capture
/// name or metadata is unusable.
fn first_seen(pcap: &Path, record: &PositionRecord) -> i64 {
  CaptureArtifact::from_path(pcap)
    .and_then(|artifact| artifact.created())
    .unwrap_or(record.timestamp_last_seen)
}
