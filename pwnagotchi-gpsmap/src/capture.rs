use std::{
  fs,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use regex::Regex;

use crate::{error::PositionError, timestamp::epoch_secs};

static MAC_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{12}$").unwrap());

/// Formats a bare 12 digit MAC into lowercase colon form.
pub fn format_mac(raw: &str) -> Option<String> {
  if !MAC_RE.is_match(raw) {
    return None;
  }

  let lower = raw.to_ascii_lowercase();
  let pairs: Vec<&str> =
    (0..lower.len()).step_by(2).filter_map(|i| lower.get(i..i + 2)).collect();
  Some(pairs.join(":"))
}

/// `ESSID_BSSID` or bare `BSSID` from a capture path.
pub fn network_id(path: &Path) -> Option<&str> {
  path.file_name()?.to_str()?.strip_suffix(".pcap")
}

/// One completed handshake capture on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifact {
  pub network_id: String,
  pub essid: String,
  pub bssid: String,
  pub path: PathBuf,
}

impl CaptureArtifact {
  pub fn from_path(path: &Path) -> Result<Self, PositionError> {
    let net_id = network_id(path).ok_or_else(|| PositionError::InvalidIdentity(path.into()))?;

    // the ESSID may itself contain underscores, the MAC never does
    let (essid, raw_bssid) = net_id.rsplit_once('_').unwrap_or(("", net_id));
    let bssid = format_mac(raw_bssid).ok_or_else(|| PositionError::InvalidIdentity(path.into()))?;

    Ok(Self {
      network_id: net_id.to_string(),
      essid: essid.to_string(),
      bssid,
      path: path.to_path_buf(),
    })
  }

  /// Directory plus network id, the stem every sidecar hangs off.
  pub fn base(&self) -> PathBuf {
    self.path.with_file_name(&self.network_id)
  }

  pub fn sidecar(&self, suffix: &str) -> PathBuf {
    self.path.with_file_name(format!("{}{suffix}", self.network_id))
  }

  /// Birth time of the capture, or its mtime where the filesystem keeps none.
  pub fn created(&self) -> Result<i64, PositionError> {
    let meta = fs::metadata(&self.path)
      .map_err(|source| PositionError::Io { path: self.path.clone(), source })?;
    let time = meta
      .created()
      .or_else(|_| meta.modified())
      .map_err(|source| PositionError::Io { path: self.path.clone(), source })?;
    Ok(epoch_secs(time))
  }
}
