use std::{
  collections::HashSet,
  fs, io,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use pwnagotchi_shared::{logger::LOGGER, utils::general::write_atomic};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReportFile {
  #[serde(default)]
  reported: Vec<String>,
}

/// Network ids that must not be sent to the grid again, persisted across
/// restarts. Membership means "handled", which includes excluded networks.
#[derive(Debug)]
pub struct ReportLedger {
  path: PathBuf,
  reported: Vec<String>,
  index: HashSet<String>,
}

impl ReportLedger {
  /// Loads the ledger at `path`. A missing file is an empty ledger; an
  /// unreadable one is logged and also starts empty. A corrupt one is moved
  /// to `<path>.corrupt` first so the next write cannot destroy it.
  pub fn load<P: AsRef<Path>>(path: P) -> Self {
    let path = path.as_ref().to_path_buf();

    let file = match fs::read_to_string(&path) {
      Ok(content) => serde_json::from_str::<ReportFile>(&content).unwrap_or_else(|e| {
        LOGGER.log_error("ledger", &format!("Ignoring corrupt {}: {e}", path.display()));
        set_aside(&path);
        ReportFile::default()
      }),
      Err(e) if e.kind() == io::ErrorKind::NotFound => ReportFile::default(),
      Err(e) => {
        LOGGER.log_error("ledger", &format!("Failed to read {}: {e}", path.display()));
        ReportFile::default()
      }
    };

    let mut ledger = Self { path, reported: Vec::new(), index: HashSet::new() };
    for id in file.reported {
      if ledger.index.insert(id.clone()) {
        ledger.reported.push(id);
      }
    }
    ledger
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn contains(&self, id: &str) -> bool {
    self.index.contains(id)
  }

  pub fn len(&self) -> usize {
    self.reported.len()
  }

  pub fn is_empty(&self) -> bool {
    self.reported.is_empty()
  }

  /// Ids in the order they were added.
  pub fn reported(&self) -> &[String] {
    &self.reported
  }

  /// Records `id` and rewrites the file. Returns `false` without touching
  /// the disk when the id is already known.
  ///
  /// # Errors
  /// Returns an error if the file could not be written; the id stays in
  /// memory either way.
  pub fn add(&mut self, id: &str) -> Result<bool> {
    if !self.index.insert(id.to_string()) {
      return Ok(false);
    }
    self.reported.push(id.to_string());
    self.persist()?;
    Ok(true)
  }

  /// # Errors
  /// Returns an error if serialization or the atomic write fails.
  pub fn persist(&self) -> Result<()> {
    let file = ReportFile { reported: self.reported.clone() };
    let json = serde_json::to_vec(&file).context("Failed to serialize report ledger")?;
    write_atomic(&self.path, &json)
      .with_context(|| format!("Failed to write {}", self.path.display()))
  }
}

fn set_aside(path: &Path) {
  let mut aside = path.as_os_str().to_os_string();
  aside.push(".corrupt");
  let aside = PathBuf::from(aside);

  match fs::rename(path, &aside) {
    Ok(()) => LOGGER.log_warning("ledger", &format!("Moved corrupt ledger to {}", aside.display())),
    Err(e) => LOGGER.log_error("ledger", &format!("Failed to move {} aside: {e}", path.display())),
  }
}
