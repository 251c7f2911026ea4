use std::{
  collections::HashMap,
  path::{Path, PathBuf},
};

use crate::{error::PositionError, position::PositionRecord};

pub const DEFAULT_CAPACITY: usize = 2048;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
  pub hits: u64,
  /// Every miss is one sidecar parse.
  pub misses: u64,
}

/// Parsed sidecars keyed by path, least recently used evicted first.
///
/// Entries are not checked against the file's mtime: a sidecar rewritten in
/// place keeps its old record until it is evicted or the cache is cleared.
#[derive(Debug, Clone)]
pub struct PositionCache {
  cap: usize,
  map: HashMap<PathBuf, PositionRecord>,
  order: Vec<PathBuf>,
  stats: CacheStats,
}

impl Default for PositionCache {
  fn default() -> Self {
    Self::new(DEFAULT_CAPACITY)
  }
}

impl PositionCache {
  pub fn new(cap: usize) -> Self {
    Self { cap, map: HashMap::new(), order: Vec::new(), stats: CacheStats::default() }
  }

  pub fn len(&self) -> usize {
    self.map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }

  pub const fn stats(&self) -> CacheStats {
    self.stats
  }

  pub fn contains(&self, path: &Path) -> bool {
    self.map.contains_key(path)
  }

  /// Returns the cached record for `path`, parsing it on a miss. Failed
  /// parses are not remembered.
  ///
  /// # Errors
  /// Whatever [`PositionRecord::parse`] returns for the file.
  pub fn get_or_parse(&mut self, path: &Path) -> Result<PositionRecord, PositionError> {
    if let Some(record) = self.get(path) {
      let record = record.clone();
      self.stats.hits += 1;
      return Ok(record);
    }

    self.stats.misses += 1;
    let record = PositionRecord::parse(path)?;
    self.insert(path.to_path_buf(), record.clone());
    Ok(record)
  }

  fn get(&mut self, path: &Path) -> Option<&PositionRecord> {
    if self.map.contains_key(path) {
      self.touch(path);
      return self.map.get(path);
    }
    None
  }

  pub fn insert(&mut self, path: PathBuf, record: PositionRecord) {
    if self.cap == 0 {
      return;
    }

    if self.map.contains_key(&path) {
      self.touch(&path);
      self.map.insert(path, record);
      return;
    }

    self.map.insert(path.clone(), record);
    self.order.push(path);

    while self.map.len() > self.cap {
      if self.order.is_empty() {
        break;
      }
      let evict = self.order.remove(0);
      self.map.remove(&evict);
    }
  }

  pub fn clear(&mut self) {
    self.map.clear();
    self.order.clear();
  }

  fn touch(&mut self, path: &Path) {
    if let Some(pos) = self.order.iter().position(|p| p == path) {
      let p = self.order.remove(pos);
      self.order.push(p);
    }
  }
}
