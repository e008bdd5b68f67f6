//! Per-client invoice numbering.
//!
//! Numbers are unique within one client only. The next number continues the
//! client's established `<prefix><sequence>` pattern from its highest
//! sequence (gaps are never filled), or starts that client's default prefix
//! at 1.
//!
//! The sequence is always the trailing run of digits. A number ending in a
//! year, such as `ENV-2-001-2026`, therefore continues as `ENV-2-001-2027`;
//! schemes that want a running counter after the year put the counter last
//! (`INV-2026-007`). A sequence that cannot be incremented within `u64` is
//! ignored like a number without digits.

use dashmap::DashMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

lazy_static! {
  static ref SEQUENCE_SUFFIX: Regex =
    Regex::new(r"^(?P<prefix>.*?)(?P<sequence>\d+)$").expect("valid sequence regex");
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedNumber<'a> {
  prefix: &'a str,
  next: u64,
  width: usize,
}

fn parse(number: &str) -> Option<ParsedNumber<'_>> {
  let captures = SEQUENCE_SUFFIX.captures(number)?;
  let prefix = captures.name("prefix")?.as_str();
  let digits = captures.name("sequence")?.as_str();
  let next = digits.parse::<u64>().ok()?.checked_add(1)?;
  // Only keep the digit width when the number was zero-padded.
  let width = if digits.starts_with('0') && digits.len() > 1 {
    digits.len()
  } else {
    0
  };
  Some(ParsedNumber {
    prefix,
    next,
    width,
  })
}

/// Computes the next number for one client from that client's existing numbers.
///
/// Numbers carrying `default_prefix` define the pattern when present; otherwise
/// the highest-sequenced number of any prefix does. Numbers without a numeric
/// suffix are ignored.
pub fn next_number<S: AsRef<str>>(existing: &[S], default_prefix: &str) -> String {
  let parsed: Vec<ParsedNumber<'_>> = existing.iter().filter_map(|n| parse(n.as_ref())).collect();

  let with_default_prefix: Vec<&ParsedNumber<'_>> = parsed
    .iter()
    .filter(|p| p.prefix == default_prefix)
    .collect();

  let candidates = if with_default_prefix.is_empty() {
    parsed.iter().collect::<Vec<_>>()
  } else {
    with_default_prefix
  };

  match candidates.into_iter().max_by_key(|p| (p.next, p.width)) {
    Some(highest) => format!(
      "{}{:0width$}",
      highest.prefix,
      highest.next,
      width = highest.width
    ),
    None => format!("{}1", default_prefix),
  }
}

/// Serializes read-compute-write numbering spans per client. Different clients
/// never contend on the same lock.
#[derive(Default, Clone)]
pub struct NumberingLocks {
  locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl NumberingLocks {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn acquire(&self, client_id: i64) -> OwnedMutexGuard<()> {
    let lock = self
      .locks
      .entry(client_id)
      .or_insert_with(|| Arc::new(Mutex::new(())))
      .clone();
    lock.lock_owned().await
  }

  /// Drops the lock entry of a deleted client.
  pub fn forget(&self, client_id: i64) {
    self.locks.remove(&client_id);
  }
}
