use std::{
  ffi::OsString,
  fs::{self, File},
  io::{BufRead, BufReader},
  path::{Path, PathBuf},
};

use pwnagotchi_shared::{logger::LOGGER, utils::general::write_atomic};

pub const CRACKED_SUFFIX: &str = ".pcap.cracked";

pub fn cracked_path(base: &Path) -> PathBuf {
  let mut path = OsString::from(base.as_os_str());
  path.push(CRACKED_SUFFIX);
  PathBuf::from(path)
}

/// Finds cracked passwords for a capture, either in its own
/// `<base>.pcap.cracked` file or in the shared pot-files next to it.
#[derive(Debug, Clone)]
pub struct PasswordResolver {
  potfiles: Vec<String>,
}

impl Default for PasswordResolver {
  fn default() -> Self {
    Self::new(["onlinehashcrack.cracked.potfile", "wpa-sec.cracked.potfile"])
  }
}

impl PasswordResolver {
  pub fn new<I, S>(potfiles: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self { potfiles: potfiles.into_iter().map(Into::into).collect() }
  }

  pub fn potfiles(&self) -> &[String] {
    &self.potfiles
  }

  /// Returns the password for `mac`, `None` when nothing has cracked it yet.
  /// A pot-file hit is cached in `<base>.pcap.cracked`.
  pub fn resolve(&self, base: &Path, mac: &str) -> Option<String> {
    let cracked = cracked_path(base);

    if cracked.is_file() {
      // SSIDs and passwords are raw bytes, not necessarily UTF-8
      match fs::read(&cracked) {
        Ok(password) => return Some(String::from_utf8_lossy(&password).into_owned()),
        Err(e) => LOGGER.log_error("webgpsmap", &format!("OS error: {e}")),
      }
    }

    let needle = mac.replace(':', "").to_lowercase();
    let dir = base.parent().unwrap_or_else(|| Path::new("."));

    for potfile in &self.potfiles {
      let path = dir.join(potfile);
      if !path.is_file() {
        continue;
      }

      let Some(password) = search_potfile(&path, &needle) else {
        continue;
      };

      if let Err(e) = write_atomic(&cracked, password.as_bytes()) {
        LOGGER.log_warning(
          "webgpsmap",
          &format!("Failed to cache password in {}: {e}", cracked.display()),
        );
      }
      return Some(password);
    }

    None
  }
}

/// Scans `ssid:mac:station:password` lines for the first one mentioning
/// `needle`. The password itself may contain colons.
fn search_potfile(path: &Path, needle: &str) -> Option<String> {
  let file = match File::open(path) {
    Ok(file) => file,
    Err(e) => {
      LOGGER.log_error("webgpsmap", &format!("Failed to open {}: {e}", path.display()));
      return None;
    }
  };

  for line in BufReader::new(file).split(b'\n') {
    let line = match line {
      Ok(line) => line,
      Err(e) => {
        LOGGER.log_error("webgpsmap", &format!("Failed to read {}: {e}", path.display()));
        return None;
      }
    };
    let line = String::from_utf8_lossy(&line);

    if !line.contains(needle) {
      continue;
    }

    let mut fields = line.splitn(4, ':');
    let (Some(_ssid), Some(_mac), Some(_station), Some(password)) =
      (fields.next(), fields.next(), fields.next(), fields.next())
    else {
      LOGGER.log_debug("webgpsmap", &format!("Skipping short pot-file line in {}", path.display()));
      continue;
    };

    return Some(password.trim_end_matches('\r').to_string());
  }

  None
}
