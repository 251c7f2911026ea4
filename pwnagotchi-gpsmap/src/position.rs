use std::{
  fs,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use pwnagotchi_shared::logger::LOGGER;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
  error::PositionError,
  timestamp::{epoch_secs, parse_iso8601},
};

/// Accuracy in meters assumed for receivers that do not report one.
pub const DEFAULT_ACCURACY: f64 = 50.0;

static MAC_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"([0-9a-fA-F]{12})\.(?:gps|geo|paw-gps)\.json$").unwrap());

static SSID_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(.+)_[0-9a-fA-F]{12}\.(?:gps|geo|paw-gps)\.json$").unwrap()
});

type JsonObject = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PositionFormat {
  /// bettercap gps module dump
  #[serde(rename = "gps")]
  Gps,
  /// network geolocation lookup
  #[serde(rename = "geo")]
  Geo,
  /// position pushed by the paw-gps companion app
  #[serde(rename = "paw")]
  PawGps,
}

impl PositionFormat {
  /// Sidecar lookup order. A later hit replaces an earlier one.
  pub const SCAN_ORDER: [Self; 3] = [Self::Gps, Self::Geo, Self::PawGps];

  pub const fn suffix(self) -> &'static str {
    match self {
      Self::Gps => ".gps.json",
      Self::Geo => ".geo.json",
      Self::PawGps => ".paw-gps.json",
    }
  }

  pub const fn tag(self) -> &'static str {
    match self {
      Self::Gps => "gps",
      Self::Geo => "geo",
      Self::PawGps => "paw",
    }
  }

  pub fn from_file_name(name: &str) -> Option<Self> {
    // ".paw-gps.json" never ends in ".gps.json", so the order is free
    Self::SCAN_ORDER.into_iter().find(|format| name.ends_with(format.suffix()))
  }

  fn normalize(self, json: &JsonObject) -> Fix {
    match self {
      Self::Gps => normalize_gps(json),
      Self::Geo => normalize_geo(json),
      Self::PawGps => normalize_paw_gps(json),
    }
  }
}

/// What a format yields before identity and fallbacks are applied.
struct Fix {
  latitude: Option<f64>,
  longitude: Option<f64>,
  accuracy: Option<f64>,
  timestamp: Option<i64>,
}

fn number(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

/// First key in `keys` that holds a number. `location.lat` style keys look
/// one object deep.
fn first_number(json: &JsonObject, keys: &[&str]) -> Option<f64> {
  keys.iter().find_map(|key| match key.split_once('.') {
    Some((outer, inner)) => json.get(outer)?.get(inner).and_then(number),
    None => json.get(*key).and_then(number),
  })
}

/// Zero is what receivers write before they have a fix.
fn coordinate(json: &JsonObject, keys: &[&str]) -> Option<f64> {
  first_number(json, keys).filter(|v| v.is_finite() && *v != 0.0)
}

#[allow(clippy::cast_possible_truncation)]
fn last_seen(json: &JsonObject) -> Option<i64> {
  if let Some(ts) = json.get("ts").and_then(number) {
    return Some(ts.round() as i64);
  }

  let updated = json.get("Updated").and_then(Value::as_str)?;
  let parsed = parse_iso8601(updated);
  if parsed.is_none() {
    LOGGER.log_debug("webgpsmap", &format!("Unparseable timestamp '{updated}'"));
  }
  parsed
}

fn normalize_gps(json: &JsonObject) -> Fix {
  Fix {
    latitude: coordinate(json, &["Latitude", "lat", "location.lat"]),
    longitude: coordinate(json, &["Longitude", "long", "location.lng"]),
    accuracy: Some(DEFAULT_ACCURACY),
    timestamp: last_seen(json),
  }
}

fn normalize_geo(json: &JsonObject) -> Fix {
  Fix {
    latitude: coordinate(json, &["location.lat", "lat", "Latitude"]),
    longitude: coordinate(json, &["location.lng", "long", "Longitude"]),
    accuracy: json.get("accuracy").and_then(number),
    timestamp: last_seen(json),
  }
}

fn normalize_paw_gps(json: &JsonObject) -> Fix {
  // older paw-gps builds wrote {"long": 14.69, "lat": 40.80}
  Fix {
    latitude: coordinate(json, &["lat", "Latitude", "location.lat"]),
    longitude: coordinate(json, &["long", "lng", "Longitude", "location.lng"]),
    accuracy: Some(DEFAULT_ACCURACY),
    timestamp: last_seen(json),
  }
}

/// A parsed position sidecar.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRecord {
  pub format: PositionFormat,
  pub essid: Option<String>,
  /// Bare 12 digit MAC as written in the file name.
  pub mac: String,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub accuracy: Option<f64>,
  pub timestamp_last_seen: i64,
  pub source_path: PathBuf,
}

impl PositionRecord {
  /// Reads and normalizes one sidecar file.
  ///
  /// # Errors
  /// `InvalidIdentity` when the name has no MAC or format suffix,
  /// `MalformedContent` when the body is not a JSON object and `Io` when the
  /// file cannot be read.
  pub fn parse(path: &Path) -> Result<Self, PositionError> {
    let invalid = || PositionError::InvalidIdentity(path.to_path_buf());

    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
    let format = PositionFormat::from_file_name(name).ok_or_else(invalid)?;
    let mac = MAC_RE.captures(name).map(|caps| caps[1].to_string()).ok_or_else(invalid)?;
    let essid = SSID_RE.captures(name).map(|caps| caps[1].to_string());

    LOGGER.log_debug("webgpsmap", &format!("loading {}", path.display()));

    let io_err = |source| PositionError::Io { path: path.to_path_buf(), source };
    let content = fs::read_to_string(path).map_err(io_err)?;

    let malformed =
      |message: String| PositionError::MalformedContent { path: path.to_path_buf(), message };
    let json = match serde_json::from_str::<Value>(&content) {
      Ok(Value::Object(obj)) => obj,
      Ok(other) => return Err(malformed(format!("expected an object, found {other}"))),
      Err(e) => return Err(malformed(e.to_string())),
    };

    let fix = format.normalize(&json);

    let timestamp_last_seen = match fix.timestamp {
      Some(ts) => ts,
      None => epoch_secs(fs::metadata(path).and_then(|m| m.modified()).map_err(io_err)?),
    };

    Ok(Self {
      format,
      essid,
      mac,
      latitude: fix.latitude,
      longitude: fix.longitude,
      accuracy: fix.accuracy,
      timestamp_last_seen,
      source_path: path.to_path_buf(),
    })
  }

  /// Latitude and longitude, only when both are known.
  pub fn coordinates(&self) -> Option<(f64, f64)> {
    self.latitude.zip(self.longitude)
  }

  /// Like [`Self::coordinates`], naming the file when either is unknown.
  ///
  /// # Errors
  /// `MissingCoordinates` when latitude or longitude is absent or zero.
  pub fn require_coordinates(&self) -> Result<(f64, f64), PositionError> {
    self.coordinates().ok_or_else(|| PositionError::MissingCoordinates(self.source_path.clone()))
  }

  /// The sidecar path with its format suffix removed.
  pub fn base(&self) -> PathBuf {
    let name = self.source_path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let stem = name.strip_suffix(self.format.suffix()).unwrap_or(name);
    self.source_path.with_file_name(stem)
  }
}
