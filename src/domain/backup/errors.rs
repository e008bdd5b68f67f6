use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One failed check in a snapshot document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotViolation {
  pub entity: &'static str,
  pub id: Option<i64>,
  pub field: &'static str,
  pub message: String,
}

impl SnapshotViolation {
  pub fn new(
    entity: &'static str,
    id: Option<i64>,
    field: &'static str,
    message: impl Into<String>,
  ) -> Self {
    Self {
      entity,
      id,
      field,
      message: message.into(),
    }
  }
}

impl fmt::Display for SnapshotViolation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.id {
      Some(id) => write!(f, "{} {}: {}: {}", self.entity, id, self.field, self.message),
      None => write!(f, "{}: {}: {}", self.entity, self.field, self.message),
    }
  }
}

#[derive(Debug, Error)]
pub enum BackupError {
  #[error("Malformed snapshot: {0}")]
  Malformed(String),

  #[error("Snapshot failed {} integrity check(s)", .0.len())]
  Integrity(Vec<SnapshotViolation>),

  #[error("Repository error: {0}")]
  Repository(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

impl From<crate::domain::invoice::InvoiceError> for BackupError {
  fn from(err: crate::domain::invoice::InvoiceError) -> Self {
    match err {
      crate::domain::invoice::InvoiceError::Database(e) => BackupError::Database(e),
      other => BackupError::Repository(other.to_string()),
    }
  }
}
