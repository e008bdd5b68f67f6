//! Invoice status lifecycle.
//!
//! Only `Draft`, `Sent` and `Paid` are ever stored. `Overdue` is a projection
//! of a stored `Sent` status and the due date against the caller's notion of
//! "today", so nothing needs to flip statuses in the background and no stale
//! `Overdue` flag can exist.
//!
//! Any stored status may be assigned to any other stored status; the regular
//! lifecycle is `Draft -> Sent -> Paid` and everything else is treated as an
//! administrative correction.

use chrono::NaiveDate;

use super::value_objects::{DisplayStatus, InvoiceStatus};

/// Derives the status shown to callers. Pure, never persisted.
pub fn display_status(
  stored: InvoiceStatus,
  due_date: NaiveDate,
  today: NaiveDate,
) -> DisplayStatus {
  match stored {
    InvoiceStatus::Sent if today > due_date => DisplayStatus::Overdue,
    other => other.into(),
  }
}

/// How a requested assignment relates to the regular lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  /// `Draft -> Sent` or `Sent -> Paid`.
  Forward,
  /// Target equals the current status.
  Unchanged,
  /// Any other assignment, accepted as a correction.
  Override,
}

pub fn classify(from: InvoiceStatus, to: InvoiceStatus) -> Transition {
  match (from, to) {
    (a, b) if a == b => Transition::Unchanged,
    (InvoiceStatus::Draft, InvoiceStatus::Sent) | (InvoiceStatus::Sent, InvoiceStatus::Paid) => {
      Transition::Forward
    }
    _ => Transition::Override,
  }
}
