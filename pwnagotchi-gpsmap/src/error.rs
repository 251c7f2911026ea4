use std::{
  error::Error,
  fmt::{Display, Formatter, Result as FmtResult},
  io,
  path::PathBuf,
};

/// Why a single sidecar file could not become a position.
#[derive(Debug)]
pub enum PositionError {
  /// The file name carries no 12 hex digit MAC, or no known format suffix.
  InvalidIdentity(PathBuf),
  /// The body is not a JSON object.
  MalformedContent { path: PathBuf, message: String },
  /// Parsed fine but latitude or longitude is absent or zero.
  MissingCoordinates(PathBuf),
  Io { path: PathBuf, source: io::Error },
}

impl PositionError {
  pub fn path(&self) -> &PathBuf {
    match self {
      PositionError::InvalidIdentity(path)
      | PositionError::MissingCoordinates(path)
      | PositionError::MalformedContent { path, .. }
      | PositionError::Io { path, .. } => path,
    }
  }
}

impl Display for PositionError {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      PositionError::InvalidIdentity(path) => {
        write!(f, "Mac can't be parsed from filename {}", path.display())
      }
      PositionError::MalformedContent { path, message } => {
        write!(f, "Malformed position data in {}: {message}", path.display())
      }
      PositionError::MissingCoordinates(path) => {
        write!(f, "No usable coordinates in {}", path.display())
      }
      PositionError::Io { path, source } => write!(f, "Failed to read {}: {source}", path.display()),
    }
  }
}

impl Error for PositionError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      PositionError::Io { source, .. } => Some(source),
      _ => None,
    }
  }
}
