use std::fs;

use serde_json::Value;

use crate::ledger::ReportLedger;

fn stored_ids(path: &std::path::Path) -> Vec<String> {
  let json: Value = serde_json::from_str(&fs::read_to_string(path).expect("read ledger"))
    .expect("ledger is json");
  json["reported"]
    .as_array()
    .expect("reported list")
    .iter()
    .filter_map(Value::as_str)
    .map(ToString::to_string)
    .collect()
}

#[test]
fn add_is_idempotent() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = dir.path().join("report.json");

  let mut ledger = ReportLedger::load(&path);
  assert!(ledger.is_empty());
  assert!(ledger.add("net1_AABBCCDDEEFF").expect("first add"));
  assert!(!ledger.add("net1_AABBCCDDEEFF").expect("second add"));

  assert_eq!(ledger.len(), 1);
  assert_eq!(stored_ids(&path), ["net1_AABBCCDDEEFF"]);
}

#[test]
fn survives_reload_in_order() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = dir.path().join("report.json");

  {
    let mut ledger = ReportLedger::load(&path);
    ledger.add("b_112233445566").expect("add b");
    ledger.add("a_AABBCCDDEEFF").expect("add a");
  }

  let ledger = ReportLedger::load(&path);
  assert!(ledger.contains("a_AABBCCDDEEFF"));
  assert!(ledger.contains("b_112233445566"));
  assert!(!ledger.contains("c_665544332211"));
  assert_eq!(ledger.reported(), ["b_112233445566", "a_AABBCCDDEEFF"]);
  assert!(!dir.path().join("report.json.tmp").exists());
}

#[test]
fn duplicates_on_disk_collapse() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = dir.path().join("report.json");
  fs::write(&path, r#"{"reported": ["x", "y", "x"]}"#).expect("write ledger");

  let mut ledger = ReportLedger::load(&path);
  assert_eq!(ledger.reported(), ["x", "y"]);

  ledger.add("z").expect("add z");
  assert_eq!(stored_ids(&path), ["x", "y", "z"]);
}

#[test]
fn corrupt_file_starts_empty() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = dir.path().join("report.json");
  fs::write(&path, "{\"reported\": [").expect("write ledger");

  let mut ledger = ReportLedger::load(&path);
  assert!(ledger.is_empty());

  ledger.add("net1_AABBCCDDEEFF").expect("add");
  assert_eq!(stored_ids(&path), ["net1_AABBCCDDEEFF"]);
}

#[test]
fn corrupt_file_is_kept_aside() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = dir.path().join("report.json");
  let aside = dir.path().join("report.json.corrupt");
  fs::write(&path, "{\"reported\": [\"net1_AABB").expect("write ledger");

  let mut ledger = ReportLedger::load(&path);
  assert!(ledger.is_empty());
  assert!(!path.exists());
  assert_eq!(fs::read_to_string(&aside).expect("read aside"), "{\"reported\": [\"net1_AABB");

  ledger.add("net2_112233445566").expect("add");
  assert_eq!(stored_ids(&path), ["net2_112233445566"]);
  assert_eq!(fs::read_to_string(&aside).expect("read aside"), "{\"reported\": [\"net1_AABB");
}

#[test]
fn write_failure_keeps_id_in_memory() {
  let dir = tempfile::tempdir().expect("tempdir");
  // a directory where the file should be makes the rename fail
  let path = dir.path().join("report.json");
  fs::create_dir(&path).expect("create blocking dir");

  let mut ledger = ReportLedger::load(&path);
  assert!(ledger.add("net1_AABBCCDDEEFF").is_err());
  assert!(ledger.contains("net1_AABBCCDDEEFF"));
}
