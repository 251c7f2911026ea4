use std::{path::Path, thread, time::Duration};

use anyhow::{Context, Result};
use pwnagotchi_shared::{config::GridConfig, logger::LOGGER, utils::general::list_captures};

use crate::{
  capture::{self, CaptureArtifact},
  exclusion::ExclusionFilter,
  ledger::ReportLedger,
};

/// The remote side of AP reporting. Returns `true` only when the grid
/// confirmed the report.
pub trait ApReporter {
  fn report_ap(&self, essid: &str, bssid: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
  pub reported: usize,
  pub excluded: usize,
  pub failed: usize,
  /// Captures whose name holds no usable BSSID.
  pub invalid: usize,
}

/// Reports pwned networks to the grid once each.
///
/// A network enters the ledger when the grid accepts it or when the
/// exclusion filter matches. Failed reports stay out and are retried on the
/// next pass.
pub struct GridReporter {
  ledger: ReportLedger,
  exclude: ExclusionFilter,
  report: bool,
  interval: Duration,
}

impl GridReporter {
  pub const fn new(
    ledger: ReportLedger,
    exclude: ExclusionFilter,
    report: bool,
    interval: Duration,
  ) -> Self {
    Self { ledger, exclude, report, interval }
  }

  pub fn from_config(config: &GridConfig) -> Self {
    Self::new(
      ReportLedger::load(&*config.report_file),
      ExclusionFilter::new(&config.exclude),
      // a disabled plugin never reports, whatever `report` says
      config.enabled && config.report,
      config.report_interval(),
    )
  }

  pub const fn ledger(&self) -> &ReportLedger {
    &self.ledger
  }

  /// # Errors
  /// Returns an error if the handshake directory cannot be listed.
  pub fn check_handshakes(
    &mut self,
    handshake_dir: &Path,
    reporter: &dyn ApReporter,
  ) -> Result<ReportSummary> {
    LOGGER.log_debug("grid", "checking pcaps");

    let captures = list_captures(handshake_dir)
      .with_context(|| format!("Failed to list {}", handshake_dir.display()))?;
    let mut summary = ReportSummary::default();

    let new: Vec<_> = captures
      .iter()
      .filter(|pcap| capture::network_id(pcap).is_some_and(|id| !self.ledger.contains(id)))
      .collect();

    if new.is_empty() {
      return Ok(summary);
    }

    if !self.report {
      LOGGER.log_debug("grid", "reporting disabled");
      return Ok(summary);
    }

    LOGGER.log_info("grid", &format!("{} new networks to report", new.len()));

    for pcap in new {
      let Some(net_id) = capture::network_id(pcap) else {
        continue;
      };

      if self.exclude.is_excluded(net_id) {
        LOGGER.log_debug("grid", &format!("skipping {} due to exclusion filter", pcap.display()));
        self.mark_reported(net_id);
        summary.excluded += 1;
        continue;
      }

      let Ok(artifact) = CaptureArtifact::from_path(pcap) else {
        LOGGER.log_warning("grid", &format!("no bssid found in {}", pcap.display()));
        summary.invalid += 1;
        continue;
      };

      if self.exclude.is_excluded(&artifact.essid) || self.exclude.is_excluded(&artifact.bssid) {
        LOGGER
          .log_debug("grid", &format!("not reporting {} due to exclusion filter", pcap.display()));
        self.mark_reported(net_id);
        summary.excluded += 1;
        continue;
      }

      LOGGER.log_info(
        "grid",
        &format!("Reporting new handshake ESSID='{}', BSSID='{}'", artifact.essid, artifact.bssid),
      );

      if reporter.report_ap(&artifact.essid, &artifact.bssid) {
        self.mark_reported(net_id);
        summary.reported += 1;
      } else {
        LOGGER.log_warning("grid", &format!("report for {net_id} failed, will retry"));
        summary.failed += 1;
      }

      if !self.interval.is_zero() {
        thread::sleep(self.interval);
      }
    }

    Ok(summary)
  }

  fn mark_reported(&mut self, net_id: &str) {
    if let Err(e) = self.ledger.add(net_id) {
      LOGGER.log_error("grid", &format!("{e:#}"));
    }
  }
}
