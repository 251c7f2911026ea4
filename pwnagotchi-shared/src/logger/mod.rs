use std::{
  fs::{self, File, OpenOptions},
  io::Write,
  path::Path,
  sync::Mutex,
};

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::config::config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
  Debug = 0,
  Info = 1,
  Warning = 2,
  Error = 3,
}

pub struct Log {
  file: Option<Mutex<File>>,
  debug_file: Option<Mutex<File>>,
  debug_enabled: bool,
}

fn open_append(path: &str) -> Option<Mutex<File>> {
  let p = Path::new(path);
  if let Some(parent) = p.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
    && let Err(e) = fs::create_dir_all(parent)
  {
    eprintln!("Failed to create log dir {parent:?}: {e}");
  }

  match OpenOptions::new().create(true).append(true).open(p) {
    Ok(file) => Some(Mutex::new(file)),
    Err(e) => {
      eprintln!("Failed to open log file {path}: {e}");
      eprintln!("Logging to stderr instead");
      None
    }
  }
}

impl Log {
  pub fn new(path: &str, debug_path: &str, debug_enabled: bool) -> Self {
    Self { file: open_append(path), debug_file: open_append(debug_path), debug_enabled }
  }

  pub fn log(&self, origin: Option<&str>, message: &str, level: LogLevel) {
    if level == LogLevel::Debug && !self.debug_enabled {
      return;
    }

    let time = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
    let entry = format!(
      "[{}] [{}] {}{}\n",
      time,
      format!("{level:?}").to_uppercase(),
      origin.map_or(String::new(), |o| format!("[{o}] ")),
      message
    );

    let (Some(file), Some(debug_file)) = (&self.file, &self.debug_file) else {
      eprint!("{entry}");
      return;
    };

    // Everything goes to the debug log
    if let Ok(mut debug_file) = debug_file.lock()
      && let Err(e) = debug_file.write_all(entry.as_bytes())
    {
      eprintln!("Failed to write debug log entry: {e}");
    }

    if level >= LogLevel::Info
      && let Ok(mut file) = file.lock()
      && let Err(e) = file.write_all(entry.as_bytes())
    {
      eprintln!("Failed to write log entry: {e}");
    }
  }

  pub fn log_debug(&self, origin: &str, message: &str) {
    self.log(Some(origin), message, LogLevel::Debug);
  }

  pub fn log_info(&self, origin: &str, message: &str) {
    self.log(Some(origin), message, LogLevel::Info);
  }

  pub fn log_warning(&self, origin: &str, message: &str) {
    self.log(Some(origin), message, LogLevel::Warning);
  }

  pub fn log_error(&self, origin: &str, message: &str) {
    self.log(Some(origin), message, LogLevel::Error);
  }
}

pub static LOGGER: std::sync::LazyLock<Log> = std::sync::LazyLock::new(|| {
  let cfg = config();
  let log = Log::new(&cfg.log.path, &cfg.log.path_debug, cfg.debug.enabled);
  log.log(None, "=========== STARTED ===========", LogLevel::Info);
  log
});
