use std::{
  fs,
  path::{Path, PathBuf},
};

pub const CAPTURE_EXTENSION: &str = "pcap";

fn is_capture(path: &Path) -> bool {
  path.is_file() && path.extension().is_some_and(|ext| ext == CAPTURE_EXTENSION)
}

pub fn total_unique_handshakes<P: AsRef<Path>>(handshakes_path: P) -> u32 {
  let mut total = 0;

  if let Ok(entries) = fs::read_dir(handshakes_path) {
    for entry in entries.filter_map(Result::ok) {
      if is_capture(&entry.path()) {
        total += 1;
      }
    }
  }

  total
}

/// Lists every capture in `handshakes_path`, sorted by file name so repeated
/// scans see the same order.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn list_captures<P: AsRef<Path>>(handshakes_path: P) -> std::io::Result<Vec<PathBuf>> {
  let mut captures: Vec<PathBuf> = fs::read_dir(handshakes_path)?
    .filter_map(Result::ok)
    .map(|entry| entry.path())
    .filter(|path| is_capture(path))
    .collect();

  captures.sort();
  Ok(captures)
}

/// Writes `contents` next to `path` first and renames it into place, so a
/// crash never leaves a half written file behind.
///
/// # Errors
/// Returns an error if the temporary file cannot be written or renamed.
pub fn write_atomic<P: AsRef<Path>>(path: P, contents: &[u8]) -> std::io::Result<()> {
  let path = path.as_ref();

  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent)?;
  }

  let mut tmp_path = path.as_os_str().to_owned();
  tmp_path.push(".tmp");

  fs::write(&tmp_path, contents)?;
  fs::rename(&tmp_path, path)?;

  Ok(())
}
