use std::{
  fs,
  path::{Path, PathBuf},
  sync::atomic::{AtomicBool, Ordering},
};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use pwnagotchi_shared::{config::Config, logger::LOGGER};

use crate::correlator::{PositionCorrelator, Positions};

pub const POSITIONS_PLACEHOLDER: &str = "var positions = [];";

const DEFAULT_TEMPLATE: &str = include_str!("../assets/webgpsmap.html");

const NOT_READY_PAGE: &str = r#"<html>
<head>
<meta charset="utf-8"/>
<style>body{font-size:1000%;}</style>
</head>
<body>Not ready yet</body>
</html>"#;

const NOT_FOUND_PAGE: &str = r#"<html>
<head>
<meta charset="utf-8"/>
<style>body{font-size:1000%;}</style>
</head>
<body>404</body>
</html>"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
  pub status: u16,
  pub content_type: &'static str,
  pub content_disposition: Option<&'static str>,
  pub body: Vec<u8>,
}

impl WebhookResponse {
  fn html(status: u16, body: impl Into<Vec<u8>>) -> Self {
    Self { status, content_type: "text/html", content_disposition: None, body: body.into() }
  }

  fn json(body: Vec<u8>) -> Self {
    Self { status: 200, content_type: "application/json", content_disposition: None, body }
  }

  fn error(e: &anyhow::Error) -> Self {
    LOGGER.log_error("webgpsmap", &format!("error: {e:#}"));
    Self {
      status: 500,
      content_type: "text/plain",
      content_disposition: None,
      body: format!("{e:#}").into_bytes(),
    }
  }
}

/// Serves handshake positions to the map page.
pub struct WebGpsMap {
  enabled: bool,
  ready: AtomicBool,
  handshakes: PathBuf,
  template: Option<PathBuf>,
  correlator: Mutex<PositionCorrelator>,
}

impl WebGpsMap {
  pub fn new(handshakes: PathBuf, template: Option<PathBuf>, correlator: PositionCorrelator) -> Self {
    Self {
      enabled: true,
      ready: AtomicBool::new(false),
      handshakes,
      template,
      correlator: Mutex::new(correlator),
    }
  }

  pub fn from_config(config: &Config) -> Self {
    let plugin = &config.plugins.webgpsmap;
    let mut map = Self::new(
      PathBuf::from(&*config.bettercap.handshakes),
      plugin.template.as_deref().map(PathBuf::from),
      PositionCorrelator::from_config(plugin),
    );
    map.enabled = plugin.enabled;
    map
  }

  pub const fn is_enabled(&self) -> bool {
    self.enabled
  }

  pub fn on_loaded(&self) {
    LOGGER.log_info("webgpsmap", "plugin loaded");
  }

  pub fn on_ready(&self) {
    self.ready.store(true, Ordering::Release);
  }

  pub fn is_ready(&self) -> bool {
    self.ready.load(Ordering::Acquire)
  }

  pub fn handshakes(&self) -> &Path {
    &self.handshakes
  }

  pub fn on_webhook(&self, method: &str, path: &str) -> WebhookResponse {
    if !self.enabled {
      return WebhookResponse::html(404, NOT_FOUND_PAGE);
    }

    if !self.is_ready() {
      return WebhookResponse::html(500, NOT_READY_PAGE);
    }

    if !method.eq_ignore_ascii_case("GET") {
      return WebhookResponse::html(404, NOT_FOUND_PAGE);
    }

    let path = path.trim_start_matches('/');
    let result = if path.is_empty() {
      self.correlator.lock().reset_sent();
      self.html().map(|page| WebhookResponse::html(200, page))
    } else if path.starts_with("all") {
      self.all().and_then(|positions| to_json(&positions)).map(WebhookResponse::json)
    } else if path.starts_with("newest") {
      self.newest().and_then(|positions| to_json(&positions)).map(WebhookResponse::json)
    } else if path.starts_with("offlinemap") {
      self.offline_map()
    } else {
      return WebhookResponse::html(404, NOT_FOUND_PAGE);
    };

    result.unwrap_or_else(|e| WebhookResponse::error(&e))
  }

  /// Every known position, starting a new session.
  pub fn all(&self) -> Result<Positions> {
    self.correlator.lock().scan(&self.handshakes)
  }

  /// Positions not served since the last full load.
  pub fn newest(&self) -> Result<Positions> {
    self.correlator.lock().scan_newest(&self.handshakes)
  }

  fn html(&self) -> Result<String> {
    match &self.template {
      Some(path) => fs::read_to_string(path)
        .with_context(|| format!("error loading template file {}", path.display())),
      None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
  }

  /// The map page with all positions inlined, for use without the unit.
  fn offline_map(&self) -> Result<WebhookResponse> {
    let json = serde_json::to_string(&self.all()?)?;
    let page = self.html()?.replace(
      POSITIONS_PLACEHOLDER,
      &format!("var positions = {json};positionsLoaded=true;drawPositions();"),
    );

    Ok(WebhookResponse {
      status: 200,
      content_type: "text/html",
      content_disposition: Some("attachment; filename=webgpsmap.html"),
      body: page.into_bytes(),
    })
  }
}

fn to_json(positions: &Positions) -> Result<Vec<u8>> {
  serde_json::to_vec(positions).context("Failed to serialize positions")
}
