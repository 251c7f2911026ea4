use std::borrow::Cow;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BettercapConfig {
  pub handshakes: Cow<'static, str>,
}

impl Default for BettercapConfig {
  fn default() -> Self {
    Self { handshakes: Cow::Borrowed("/home/pi/handshakes") }
  }
}
