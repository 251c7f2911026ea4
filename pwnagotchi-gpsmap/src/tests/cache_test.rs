use std::{
  fs,
  path::{Path, PathBuf},
};

use serde_json::json;

use crate::cache::{CacheStats, PositionCache};

fn sidecar(dir: &Path, name: &str) -> PathBuf {
  let path = dir.join(name);
  fs::write(&path, json!({"lat": 40.1, "long": 14.2}).to_string()).expect("write sidecar");
  path
}

#[test]
fn second_lookup_is_a_hit() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = sidecar(dir.path(), "a_AABBCCDDEEFF.paw-gps.json");

  let mut cache = PositionCache::new(8);
  let first = cache.get_or_parse(&path).expect("parse");
  let second = cache.get_or_parse(&path).expect("cached");

  assert_eq!(first, second);
  assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
}

#[test]
fn least_recently_used_is_evicted() {
  let dir = tempfile::tempdir().expect("tempdir");
  let a = sidecar(dir.path(), "a_AABBCCDDEEFF.paw-gps.json");
  let b = sidecar(dir.path(), "b_AABBCCDDEEFF.paw-gps.json");
  let c = sidecar(dir.path(), "c_AABBCCDDEEFF.paw-gps.json");

  let mut cache = PositionCache::new(2);
  cache.get_or_parse(&a).expect("a");
  cache.get_or_parse(&b).expect("b");
  cache.get_or_parse(&a).expect("a again");
  cache.get_or_parse(&c).expect("c");

  assert_eq!(cache.len(), 2);
  assert!(cache.contains(&a));
  assert!(!cache.contains(&b));
  assert!(cache.contains(&c));
}

#[test]
fn cached_record_survives_rewrite() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = sidecar(dir.path(), "a_AABBCCDDEEFF.paw-gps.json");

  let mut cache = PositionCache::default();
  cache.get_or_parse(&path).expect("parse");
  fs::write(&path, json!({"lat": 1.0, "long": 2.0}).to_string()).expect("rewrite");

  assert_eq!(cache.get_or_parse(&path).expect("cached").latitude, Some(40.1));

  cache.clear();
  assert!(cache.is_empty());
  assert_eq!(cache.get_or_parse(&path).expect("reparsed").latitude, Some(1.0));
}

#[test]
fn failures_are_not_cached() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = dir.path().join("a_AABBCCDDEEFF.gps.json");
  fs::write(&path, "{not json").expect("write");

  let mut cache = PositionCache::new(8);
  assert!(cache.get_or_parse(&path).is_err());
  assert!(cache.get_or_parse(&path).is_err());

  assert!(cache.is_empty());
  assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 2 });
}

#[test]
fn zero_capacity_never_stores() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = sidecar(dir.path(), "a_AABBCCDDEEFF.paw-gps.json");

  let mut cache = PositionCache::new(0);
  cache.get_or_parse(&path).expect("parse");
  cache.get_or_parse(&path).expect("parse again");

  assert!(cache.is_empty());
  assert_eq!(cache.stats().misses, 2);
}
