use std::time::{SystemTime, UNIX_EPOCH};

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Seconds since the epoch, rounded to the nearest second.
#[allow(clippy::cast_possible_truncation)]
pub fn epoch_secs(time: SystemTime) -> i64 {
  match time.duration_since(UNIX_EPOCH) {
    Ok(d) => d.as_secs_f64().round() as i64,
    Err(e) => -(e.duration().as_secs_f64().round() as i64),
  }
}

/// Rewrites the datetime strings gps receivers write into strict RFC 3339:
/// `Z` becomes `+00:00`, the fraction is padded or cut to six digits and a
/// colon-less offset such as `+0200` becomes `+02:00`. A missing offset is
/// read as UTC.
pub fn normalize_iso8601(raw: &str) -> Option<String> {
  let mut s = raw.trim().replace(' ', "T");
  if s.ends_with(['Z', 'z']) {
    s.pop();
    s.push_str("+00:00");
  }

  let (date, time) = s.split_once(['T', 't'])?;

  let (clock, sign, offset) = match time.rfind(['+', '-']) {
    Some(idx) => (&time[..idx], &time[idx..=idx], &time[idx + 1..]),
    None => (time, "+", "00:00"),
  };

  let (hms, fraction) = clock.split_once('.').unwrap_or((clock, ""));
  if !fraction.chars().all(|c| c.is_ascii_digit()) {
    return None;
  }
  let micros: String = fraction.chars().chain(std::iter::repeat('0')).take(6).collect();

  let offset = match offset.len() {
    4 if offset.bytes().all(|b| b.is_ascii_digit()) => format!("{}:{}", &offset[..2], &offset[2..]),
    2 => format!("{offset}:00"),
    _ => offset.to_string(),
  };

  Some(format!("{date}T{hms}.{micros}{sign}{offset}"))
}

/// Parses a normalized ISO 8601 datetime into epoch seconds.
pub fn parse_iso8601(raw: &str) -> Option<i64> {
  let normalized = normalize_iso8601(raw)?;
  let parsed = OffsetDateTime::parse(&normalized, &Rfc3339).ok()?;

  let secs = parsed.unix_timestamp();
  Some(if parsed.nanosecond() >= 500_000_000 { secs + 1 } else { secs })
}
