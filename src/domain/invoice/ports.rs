use async_trait::async_trait;
use serde::Serialize;

use super::entities::{Client, ClientDetails, Invoice, InvoiceDraft, InvoiceRevision, Settings};
use super::errors::InvoiceError;
use super::value_objects::InvoiceStatus;

#[async_trait]
pub trait ClientRepository: Send + Sync {
  /// Persists a new client; the repository assigns the id and creation time.
  async fn create(&self, details: ClientDetails) -> Result<Client, InvoiceError>;
  async fn update(&self, client: Client) -> Result<Client, InvoiceError>;
  async fn find_by_id(&self, id: i64) -> Result<Option<Client>, InvoiceError>;
  async fn list(&self) -> Result<Vec<Client>, InvoiceError>;
  /// Irreversibly deletes a client. Fails with `ClientHasInvoices` while the
  /// client still owns invoices. Returns `false` if no such client existed.
  async fn delete(&self, id: i64) -> Result<bool, InvoiceError>;
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  /// Persists an invoice together with its line items. Fails with
  /// `InvoiceNumberAlreadyExists` when the number is taken for that client.
  async fn create(&self, draft: InvoiceDraft) -> Result<Invoice, InvoiceError>;
  /// Overwrites an invoice's content and replaces its line items as a set.
  /// The stored status is left as it is.
  async fn update(
    &self,
    id: i64,
    revision: InvoiceRevision,
  ) -> Result<Option<Invoice>, InvoiceError>;
  async fn update_status(
    &self,
    id: i64,
    status: InvoiceStatus,
  ) -> Result<Option<Invoice>, InvoiceError>;
  async fn find_by_id(&self, id: i64) -> Result<Option<Invoice>, InvoiceError>;
  /// Lists invoices, newest issue date first, optionally for one client.
  async fn list(&self, client_id: Option<i64>) -> Result<Vec<Invoice>, InvoiceError>;
  async fn list_invoice_numbers_for_client(
    &self,
    client_id: i64,
  ) -> Result<Vec<String>, InvoiceError>;
  async fn count_for_client(&self, client_id: i64) -> Result<usize, InvoiceError>;
  /// Irreversibly deletes an invoice and its line items.
  async fn delete(&self, id: i64) -> Result<bool, InvoiceError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
  async fn get(&self) -> Result<Settings, InvoiceError>;
  /// Last writer wins.
  async fn update(&self, settings: Settings) -> Result<Settings, InvoiceError>;
}

/// Outbound message announcing an invoice event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
  pub webhook_url: String,
  pub content: String,
}

/// Best-effort delivery of notifications. Callers enforce their own timeout
/// and treat any error as non-fatal.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
  async fn deliver(&self, notification: &Notification) -> Result<(), InvoiceError>;
}
