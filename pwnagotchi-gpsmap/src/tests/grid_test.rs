use std::{cell::RefCell, collections::HashSet, fs, path::Path, time::Duration};

use crate::{
  exclusion::ExclusionFilter,
  grid::{ApReporter, GridReporter, ReportSummary},
  ledger::ReportLedger,
};

#[derive(Default)]
struct FakeGrid {
  failing: HashSet<String>,
  calls: RefCell<Vec<(String, String)>>,
}

impl ApReporter for FakeGrid {
  fn report_ap(&self, essid: &str, bssid: &str) -> bool {
    self.calls.borrow_mut().push((essid.to_string(), bssid.to_string()));
    !self.failing.contains(bssid)
  }
}

fn captures(dir: &Path, net_ids: &[&str]) {
  for net_id in net_ids {
    fs::write(dir.join(format!("{net_id}.pcap")), b"pcap").expect("write capture");
  }
}

fn reporter(dir: &Path, exclude: &[&str], report: bool) -> GridReporter {
  GridReporter::new(
    ReportLedger::load(dir.join(".api-report.json")),
    ExclusionFilter::new(exclude),
    report,
    Duration::ZERO,
  )
}

#[test]
fn exclusion_matching() {
  let filter = ExclusionFilter::new(["HomeNet", "AA:BB:CC", ""]);

  assert!(filter.is_excluded("myhomenet"));
  assert!(filter.is_excluded("HOMENET_001122334455"));
  assert!(filter.is_excluded("aa:bb:cc:dd:ee:ff"));
  assert!(filter.is_excluded("net_AABBCCDDEEFF"));
  assert!(!filter.is_excluded("office"));
  assert!(!ExclusionFilter::default().is_excluded("anything"));
  assert!(ExclusionFilter::new([""]).is_empty());
}

#[test]
fn reports_new_networks_once() {
  let hs = tempfile::tempdir().expect("tempdir");
  captures(hs.path(), &["net1_AABBCCDDEEFF", "my_net_112233445566", "665544332211"]);

  let grid = FakeGrid::default();
  let mut reporter = reporter(hs.path(), &[], true);

  let summary = reporter.check_handshakes(hs.path(), &grid).expect("first pass");
  assert_eq!(summary, ReportSummary { reported: 3, ..ReportSummary::default() });
  assert_eq!(
    grid.calls.borrow().as_slice(),
    [
      ("".to_string(), "66:55:44:33:22:11".to_string()),
      ("my_net".to_string(), "11:22:33:44:55:66".to_string()),
      ("net1".to_string(), "aa:bb:cc:dd:ee:ff".to_string()),
    ]
  );

  let summary = reporter.check_handshakes(hs.path(), &grid).expect("second pass");
  assert_eq!(summary, ReportSummary::default());
  assert_eq!(grid.calls.borrow().len(), 3);

  // a restart sees the same ledger
  let mut restarted = self::reporter(hs.path(), &[], true);
  assert_eq!(restarted.ledger().len(), 3);
  restarted.check_handshakes(hs.path(), &grid).expect("after restart");
  assert_eq!(grid.calls.borrow().len(), 3);
}

#[test]
fn failed_reports_are_retried() {
  let hs = tempfile::tempdir().expect("tempdir");
  captures(hs.path(), &["ok_AABBCCDDEEFF", "down_112233445566"]);

  let mut grid = FakeGrid::default();
  grid.failing.insert("11:22:33:44:55:66".to_string());
  let mut reporter = reporter(hs.path(), &[], true);

  let summary = reporter.check_handshakes(hs.path(), &grid).expect("first pass");
  assert_eq!(summary, ReportSummary { reported: 1, failed: 1, ..ReportSummary::default() });
  assert!(!reporter.ledger().contains("down_112233445566"));

  grid.failing.clear();
  let summary = reporter.check_handshakes(hs.path(), &grid).expect("second pass");
  assert_eq!(summary, ReportSummary { reported: 1, ..ReportSummary::default() });
  assert!(reporter.ledger().contains("down_112233445566"));
}

#[test]
fn excluded_networks_are_marked_without_reporting() {
  let hs = tempfile::tempdir().expect("tempdir");
  captures(hs.path(), &["HomeNet_AABBCCDDEEFF", "cafe_112233445566", "other_665544332211"]);

  let grid = FakeGrid::default();
  let mut reporter = reporter(hs.path(), &["homenet", "11:22:33"], true);

  let summary = reporter.check_handshakes(hs.path(), &grid).expect("pass");
  assert_eq!(summary, ReportSummary { reported: 1, excluded: 2, ..ReportSummary::default() });
  assert_eq!(grid.calls.borrow().len(), 1);
  assert!(reporter.ledger().contains("HomeNet_AABBCCDDEEFF"));
  assert!(reporter.ledger().contains("cafe_112233445566"));
}

#[test]
fn captures_without_bssid_stay_unreported() {
  let hs = tempfile::tempdir().expect("tempdir");
  captures(hs.path(), &["broken_capture"]);

  let grid = FakeGrid::default();
  let mut reporter = reporter(hs.path(), &[], true);

  let summary = reporter.check_handshakes(hs.path(), &grid).expect("pass");
  assert_eq!(summary, ReportSummary { invalid: 1, ..ReportSummary::default() });
  assert!(reporter.ledger().is_empty());
  assert!(grid.calls.borrow().is_empty());
}

#[test]
fn disabled_reporting_touches_nothing() {
  let hs = tempfile::tempdir().expect("tempdir");
  captures(hs.path(), &["net1_AABBCCDDEEFF"]);

  let grid = FakeGrid::default();
  let mut reporter = reporter(hs.path(), &["net1"], false);

  assert_eq!(reporter.check_handshakes(hs.path(), &grid).expect("pass"), ReportSummary::default());
  assert!(reporter.ledger().is_empty());
  assert!(!hs.path().join(".api-report.json").exists());
}

#[test]
fn disabled_plugin_never_reports() {
  let hs = tempfile::tempdir().expect("tempdir");
  captures(hs.path(), &["net1_AABBCCDDEEFF"]);

  let config = pwnagotchi_shared::config::GridConfig {
    enabled: false,
    report: true,
    report_interval_ms: 0,
    report_file: hs.path().join(".api-report.json").to_string_lossy().into_owned().into(),
    ..Default::default()
  };

  let grid = FakeGrid::default();
  let mut reporter = GridReporter::from_config(&config);

  assert_eq!(reporter.check_handshakes(hs.path(), &grid).expect("pass"), ReportSummary::default());
  assert!(grid.calls.borrow().is_empty());
  assert!(reporter.ledger().is_empty());

  let enabled = pwnagotchi_shared::config::GridConfig { enabled: true, ..config };
  let mut reporter = GridReporter::from_config(&enabled);
  let summary = reporter.check_handshakes(hs.path(), &grid).expect("pass");
  assert_eq!(summary, ReportSummary { reported: 1, ..ReportSummary::default() });
}
