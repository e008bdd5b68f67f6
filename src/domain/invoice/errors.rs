use super::value_objects::ValueObjectError;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Due date {due_date} is before issue date {date_issued}")]
  DueDateBeforeIssueDate {
    date_issued: NaiveDate,
    due_date: NaiveDate,
  },

  #[error("Invalid status: {0}")]
  InvalidStatus(String),

  #[error("Client not found: {0}")]
  ClientNotFound(i64),

  #[error("Invoice not found: {0}")]
  InvoiceNotFound(i64),

  #[error("Invoice number '{invoice_number}' already exists for client {client_id}")]
  InvoiceNumberAlreadyExists {
    client_id: i64,
    invoice_number: String,
  },

  #[error("Client {client_id} still has {invoice_count} invoice(s)")]
  ClientHasInvoices { client_id: i64, invoice_count: usize },

  #[error("Notification delivery failed: {0}")]
  Notification(String),

  #[error("Repository error: {0}")]
  Repository(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

impl InvoiceError {
  /// Conflicts a caller may resolve by recomputing the invoice number.
  pub fn is_number_conflict(&self) -> bool {
    matches!(self, InvoiceError::InvoiceNumberAlreadyExists { .. })
  }
}
