use chrono::{Duration as ChronoDuration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::calculator::{self, InvoiceTotals, LineInput};
use super::entities::{
  Client, ClientDetails, Invoice, InvoiceDraft, InvoiceRevision, NewLineItem, Settings,
};
use super::errors::InvoiceError;
use super::numbering::{self, NumberingLocks};
use super::ports::{
  ClientRepository, InvoiceRepository, Notification, NotificationGateway, SettingsRepository,
};
use super::status::{self, Transition};
use super::value_objects::{
  DisplayStatus, InvoiceNumber, InvoiceStatus, LineItemDescription, Quantity, Rate, VatPercentage,
};

/// Attempts made when a generated number loses a race at the persistence layer.
const MAX_NUMBERING_ATTEMPTS: usize = 3;

/// Line item as entered by the caller.
#[derive(Debug, Clone)]
pub struct LineItemData {
  pub description: LineItemDescription,
  pub quantity: Quantity,
  pub rate: Rate,
}

/// Invoice creation/update data. A missing invoice number is generated on
/// create (and kept as-is on update); a missing due date defaults to the
/// configured payment term after the issue date.
#[derive(Debug, Clone)]
pub struct InvoiceData {
  pub client_id: i64,
  pub invoice_number: Option<String>,
  pub date_issued: NaiveDate,
  pub due_date: Option<NaiveDate>,
  pub vat_exempt: bool,
  pub vat_exempt_reason: Option<String>,
  pub line_items: Vec<LineItemData>,
}

/// Result of the best-effort notification attached to a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum NotificationOutcome {
  Delivered,
  Skipped,
  Failed(String),
}

#[derive(Debug, Clone)]
pub struct StatusChange {
  pub invoice: Invoice,
  pub notification: NotificationOutcome,
}

#[derive(Debug, Clone)]
pub struct InvoiceServiceConfig {
  pub notification_timeout: Duration,
  pub default_payment_days: i64,
}

impl Default for InvoiceServiceConfig {
  fn default() -> Self {
    Self {
      notification_timeout: Duration::from_secs(3),
      default_payment_days: 14,
    }
  }
}

pub struct InvoiceServiceDependencies {
  pub client_repo: Arc<dyn ClientRepository>,
  pub invoice_repo: Arc<dyn InvoiceRepository>,
  pub settings_repo: Arc<dyn SettingsRepository>,
  pub notifier: Arc<dyn NotificationGateway>,
}

/// Priced invoice content, independent of the number it will be stored under.
#[derive(Clone)]
struct PricedInvoice {
  due_date: NaiveDate,
  vat_exempt: bool,
  vat_exempt_reason: Option<String>,
  items: Vec<NewLineItem>,
  total_amount: Decimal,
}

impl PricedInvoice {
  fn into_draft(
    self,
    client_id: i64,
    invoice_number: InvoiceNumber,
    date_issued: NaiveDate,
    status: InvoiceStatus,
  ) -> InvoiceDraft {
    InvoiceDraft {
      client_id,
      invoice_number,
      date_issued,
      due_date: self.due_date,
      status,
      vat_exempt: self.vat_exempt,
      vat_exempt_reason: self.vat_exempt_reason,
      items: self.items,
      total_amount: self.total_amount,
    }
  }

  fn into_revision(
    self,
    client_id: i64,
    invoice_number: InvoiceNumber,
    date_issued: NaiveDate,
  ) -> InvoiceRevision {
    InvoiceRevision {
      client_id,
      invoice_number,
      date_issued,
      due_date: self.due_date,
      vat_exempt: self.vat_exempt,
      vat_exempt_reason: self.vat_exempt_reason,
      items: self.items,
      total_amount: self.total_amount,
    }
  }
}

pub struct InvoiceService {
  client_repo: Arc<dyn ClientRepository>,
  invoice_repo: Arc<dyn InvoiceRepository>,
  settings_repo: Arc<dyn SettingsRepository>,
  notifier: Arc<dyn NotificationGateway>,
  numbering_locks: NumberingLocks,
  config: InvoiceServiceConfig,
}

impl InvoiceService {
  pub fn new(deps: InvoiceServiceDependencies, config: InvoiceServiceConfig) -> Self {
    Self {
      client_repo: deps.client_repo,
      invoice_repo: deps.invoice_repo,
      settings_repo: deps.settings_repo,
      notifier: deps.notifier,
      numbering_locks: NumberingLocks::new(),
      config,
    }
  }

  // Client operations
  pub async fn create_client(&self, details: ClientDetails) -> Result<Client, InvoiceError> {
    let client = self.client_repo.create(details).await?;
    tracing::info!(client_id = client.id, "Client created");
    Ok(client)
  }

  pub async fn update_client(
    &self,
    client_id: i64,
    details: ClientDetails,
  ) -> Result<Client, InvoiceError> {
    let mut client = self.get_client(client_id).await?;
    client.update(details);
    self.client_repo.update(client).await
  }

  pub async fn get_client(&self, client_id: i64) -> Result<Client, InvoiceError> {
    self
      .client_repo
      .find_by_id(client_id)
      .await?
      .ok_or(InvoiceError::ClientNotFound(client_id))
  }

  pub async fn list_clients(&self) -> Result<Vec<Client>, InvoiceError> {
    self.client_repo.list().await
  }

  /// Irreversible. Rejected while the client still owns invoices.
  pub async fn delete_client(&self, client_id: i64) -> Result<(), InvoiceError> {
    let invoice_count = self.invoice_repo.count_for_client(client_id).await?;
    if invoice_count > 0 {
      return Err(InvoiceError::ClientHasInvoices {
        client_id,
        invoice_count,
      });
    }

    if !self.client_repo.delete(client_id).await? {
      return Err(InvoiceError::ClientNotFound(client_id));
    }

    self.numbering_locks.forget(client_id);
    tracing::info!(client_id, "Client deleted");
    Ok(())
  }

  // Numbering
  /// Proposes the next number for a client without reserving it.
  pub async fn next_invoice_number(&self, client_id: i64) -> Result<String, InvoiceError> {
    let client = self.get_client(client_id).await?;
    self.compute_next_number(&client).await
  }

  async fn compute_next_number(&self, client: &Client) -> Result<String, InvoiceError> {
    let existing = self
      .invoice_repo
      .list_invoice_numbers_for_client(client.id)
      .await?;
    Ok(numbering::next_number(&existing, &client.invoice_prefix()))
  }

  // Totals
  pub async fn current_vat_percentage(&self) -> Result<VatPercentage, InvoiceError> {
    let settings = self.settings_repo.get().await?;
    Ok(settings.vat_percentage()?)
  }

  pub fn compute_totals(
    items: &[LineInput],
    vat_percentage: VatPercentage,
    vat_exempt: bool,
  ) -> Result<InvoiceTotals, InvoiceError> {
    Ok(calculator::compute_totals(items, vat_percentage, vat_exempt)?)
  }

  // Invoice operations
  pub async fn create_invoice(&self, data: InvoiceData) -> Result<Invoice, InvoiceError> {
    let client = self.get_client(data.client_id).await?;
    let settings = self.settings_repo.get().await?;

    let client_id = data.client_id;
    let date_issued = data.date_issued;
    let requested_number = data.invoice_number.clone();
    let priced = self.price(data, &settings)?;

    let invoice = match requested_number {
      Some(number) => {
        let number = InvoiceNumber::new(number)?;
        let draft = priced.into_draft(client_id, number, date_issued, InvoiceStatus::Draft);
        self.invoice_repo.create(draft).await?
      }
      None => {
        self
          .create_with_generated_number(&client, priced, date_issued)
          .await?
      }
    };

    tracing::info!(
      invoice_id = invoice.id,
      client_id,
      invoice_number = %invoice.invoice_number,
      total = %invoice.total_amount,
      "Invoice created"
    );
    Ok(invoice)
  }

  /// Holds the client's numbering lock across read-compute-write and retries
  /// with a fresh number if the persistence layer still reports a conflict
  /// (e.g. another process writing to the same database).
  async fn create_with_generated_number(
    &self,
    client: &Client,
    priced: PricedInvoice,
    date_issued: NaiveDate,
  ) -> Result<Invoice, InvoiceError> {
    let _guard = self.numbering_locks.acquire(client.id).await;
    let mut attempt = 0;

    loop {
      attempt += 1;
      let number = InvoiceNumber::new(self.compute_next_number(client).await?)?;
      let draft = priced
        .clone()
        .into_draft(client.id, number.clone(), date_issued, InvoiceStatus::Draft);

      match self.invoice_repo.create(draft).await {
        Err(e) if e.is_number_conflict() && attempt < MAX_NUMBERING_ATTEMPTS => {
          tracing::warn!(
            client_id = client.id,
            invoice_number = %number,
            attempt,
            "Generated invoice number already taken, retrying"
          );
        }
        result => return result,
      }
    }
  }

  /// Saves new invoice content. The item list is replaced as a whole and the
  /// stored status is never written, so a status change racing with the edit
  /// is kept. Paid invoices stay editable.
  pub async fn update_invoice(
    &self,
    invoice_id: i64,
    data: InvoiceData,
  ) -> Result<Invoice, InvoiceError> {
    let existing = self.get_invoice(invoice_id).await?;
    self.get_client(data.client_id).await?;
    let settings = self.settings_repo.get().await?;

    let invoice_number = match data.invoice_number.clone() {
      Some(number) => InvoiceNumber::new(number)?,
      None => existing.invoice_number.clone(),
    };
    let client_id = data.client_id;
    let date_issued = data.date_issued;
    let priced = self.price(data, &settings)?;
    let revision = priced.into_revision(client_id, invoice_number, date_issued);

    let invoice = self
      .invoice_repo
      .update(invoice_id, revision)
      .await?
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))?;

    tracing::info!(invoice_id, total = %invoice.total_amount, "Invoice updated");
    Ok(invoice)
  }

  /// Irreversible; removes the invoice and its line items.
  pub async fn delete_invoice(&self, invoice_id: i64) -> Result<(), InvoiceError> {
    if !self.invoice_repo.delete(invoice_id).await? {
      return Err(InvoiceError::InvoiceNotFound(invoice_id));
    }
    tracing::info!(invoice_id, "Invoice deleted");
    Ok(())
  }

  pub async fn get_invoice(&self, invoice_id: i64) -> Result<Invoice, InvoiceError> {
    self
      .invoice_repo
      .find_by_id(invoice_id)
      .await?
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))
  }

  /// Lists invoices; the status filter applies to the display status, so
  /// `Overdue` can be filtered on even though it is never stored.
  pub async fn list_invoices(
    &self,
    client_id: Option<i64>,
    status: Option<DisplayStatus>,
    today: NaiveDate,
  ) -> Result<Vec<Invoice>, InvoiceError> {
    if let Some(client_id) = client_id {
      self.get_client(client_id).await?;
    }

    let invoices = self.invoice_repo.list(client_id).await?;
    Ok(match status {
      Some(wanted) => invoices
        .into_iter()
        .filter(|invoice| invoice.display_status(today) == wanted)
        .collect(),
      None => invoices,
    })
  }

  // Status operations
  /// Assigns any storable status. `Overdue` is rejected before this point by
  /// the `InvoiceStatus` type itself.
  pub async fn set_status(
    &self,
    invoice_id: i64,
    new_status: InvoiceStatus,
  ) -> Result<Invoice, InvoiceError> {
    let current = self.get_invoice(invoice_id).await?;

    let invoice = self
      .invoice_repo
      .update_status(invoice_id, new_status)
      .await?
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))?;

    match status::classify(current.status, new_status) {
      Transition::Forward => tracing::info!(
        invoice_id,
        from = %current.status,
        to = %new_status,
        "Invoice status changed"
      ),
      Transition::Override => tracing::info!(
        invoice_id,
        from = %current.status,
        to = %new_status,
        "Invoice status overridden"
      ),
      Transition::Unchanged => {
        tracing::debug!(invoice_id, status = %new_status, "Invoice status unchanged")
      }
    }

    Ok(invoice)
  }

  /// Sets `Paid`, then announces it through the notification gateway. The
  /// notification never fails or rolls back the status change.
  pub async fn mark_paid(&self, invoice_id: i64) -> Result<StatusChange, InvoiceError> {
    let invoice = self.set_status(invoice_id, InvoiceStatus::Paid).await?;
    let notification = self.announce_paid(&invoice).await;
    Ok(StatusChange {
      invoice,
      notification,
    })
  }

  async fn announce_paid(&self, invoice: &Invoice) -> NotificationOutcome {
    let webhook_url = match self.settings_repo.get().await {
      Ok(settings) => match settings.webhook_url() {
        Some(url) => url.to_string(),
        None => return NotificationOutcome::Skipped,
      },
      Err(e) => {
        tracing::warn!(invoice_id = invoice.id, error = %e, "Could not read settings for notification");
        return NotificationOutcome::Failed(e.to_string());
      }
    };

    let client_name = match self.client_repo.find_by_id(invoice.client_id).await {
      Ok(Some(client)) => client.name.value().to_string(),
      _ => "Unknown Client".to_string(),
    };

    let notification = Notification {
      webhook_url,
      content: format!(
        "✅ **Invoice Paid**\nInvoice **#{}** for **{}** has been marked as paid.\nTotal Amount: {:.2}",
        invoice.invoice_number, client_name, invoice.total_amount
      ),
    };

    match self.deliver_with_timeout(&notification).await {
      Ok(()) => {
        tracing::debug!(invoice_id = invoice.id, "Paid notification delivered");
        NotificationOutcome::Delivered
      }
      Err(e) => {
        tracing::warn!(invoice_id = invoice.id, error = %e, "Paid notification failed");
        NotificationOutcome::Failed(e.to_string())
      }
    }
  }

  async fn deliver_with_timeout(&self, notification: &Notification) -> Result<(), InvoiceError> {
    let timeout = self.config.notification_timeout;
    match tokio::time::timeout(timeout, self.notifier.deliver(notification)).await {
      Ok(result) => result,
      Err(_) => Err(InvoiceError::Notification(format!(
        "timed out after {} ms",
        timeout.as_millis()
      ))),
    }
  }

  // Settings operations
  pub async fn get_settings(&self) -> Result<Settings, InvoiceError> {
    self.settings_repo.get().await
  }

  pub async fn update_settings(&self, settings: Settings) -> Result<Settings, InvoiceError> {
    settings.vat_percentage()?;
    let updated = self.settings_repo.update(settings).await?;
    tracing::info!("Settings updated");
    Ok(updated)
  }

  /// Sends a test message; unlike event notifications, failure is reported.
  pub async fn test_webhook(&self, webhook_url: String) -> Result<(), InvoiceError> {
    let notification = Notification {
      webhook_url,
      content: "✅ **Test Notification**\nThis is a test message from Invoicer.".to_string(),
    };
    self.deliver_with_timeout(&notification).await
  }

  fn price(&self, data: InvoiceData, settings: &Settings) -> Result<PricedInvoice, InvoiceError> {
    let due_date = data.due_date.unwrap_or_else(|| {
      data.date_issued + ChronoDuration::days(self.config.default_payment_days)
    });
    if due_date < data.date_issued {
      return Err(InvoiceError::DueDateBeforeIssueDate {
        date_issued: data.date_issued,
        due_date,
      });
    }

    let vat_exempt_reason = resolve_exempt_reason(data.vat_exempt, data.vat_exempt_reason, settings);

    let inputs: Vec<LineInput> = data
      .line_items
      .iter()
      .map(|item| LineInput {
        quantity: item.quantity,
        rate: item.rate,
      })
      .collect();
    let totals = calculator::compute_totals(&inputs, settings.vat_percentage()?, data.vat_exempt)?;

    let items = data
      .line_items
      .into_iter()
      .zip(totals.item_amounts)
      .map(|(item, amount)| NewLineItem {
        description: item.description,
        quantity: item.quantity,
        rate: item.rate,
        amount,
      })
      .collect();

    Ok(PricedInvoice {
      due_date,
      vat_exempt: data.vat_exempt,
      vat_exempt_reason,
      items,
      total_amount: totals.total,
    })
  }
}

/// Applies the settings' default exemption reason when an exempt invoice has
/// none. An exempt invoice without any reason is still accepted.
fn resolve_exempt_reason(
  vat_exempt: bool,
  reason: Option<String>,
  settings: &Settings,
) -> Option<String> {
  let reason = reason
    .map(|r| r.trim().to_string())
    .filter(|r| !r.is_empty());
  if !vat_exempt || reason.is_some() {
    return reason;
  }
  let default_reason = settings.default_vat_exempt_reason.trim();
  if default_reason.is_empty() {
    tracing::debug!("VAT-exempt invoice saved without an exemption reason");
    None
  } else {
    Some(default_reason.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::value_objects::{ClientName, ValueObjectError};
  use crate::infrastructure::persistence::memory::InMemoryDatabase;
  use async_trait::async_trait;
  use rust_decimal_macros::dec;
  use std::sync::Mutex;
  use tokio::sync::Notify;

  #[derive(Default)]
  struct RecordingGateway {
    delivered: Mutex<Vec<Notification>>,
  }

  #[async_trait]
  impl NotificationGateway for RecordingGateway {
    async fn deliver(&self, notification: &Notification) -> Result<(), InvoiceError> {
      self.delivered.lock().unwrap().push(notification.clone());
      Ok(())
    }
  }

  struct FailingGateway;

  #[async_trait]
  impl NotificationGateway for FailingGateway {
    async fn deliver(&self, _notification: &Notification) -> Result<(), InvoiceError> {
      Err(InvoiceError::Notification("HTTP 500".to_string()))
    }
  }

  struct HangingGateway;

  #[async_trait]
  impl NotificationGateway for HangingGateway {
    async fn deliver(&self, _notification: &Notification) -> Result<(), InvoiceError> {
      tokio::time::sleep(Duration::from_secs(3600)).await;
      Ok(())
    }
  }

  /// Invoice store whose content updates stop at a gate until released.
  struct GatedInvoices {
    inner: Arc<InMemoryDatabase>,
    reached: Arc<Notify>,
    release: Arc<Notify>,
  }

  #[async_trait]
  impl InvoiceRepository for GatedInvoices {
    async fn create(&self, draft: InvoiceDraft) -> Result<Invoice, InvoiceError> {
      InvoiceRepository::create(&*self.inner, draft).await
    }

    async fn update(
      &self,
      id: i64,
      revision: InvoiceRevision,
    ) -> Result<Option<Invoice>, InvoiceError> {
      self.reached.notify_one();
      self.release.notified().await;
      InvoiceRepository::update(&*self.inner, id, revision).await
    }

    async fn update_status(
      &self,
      id: i64,
      status: InvoiceStatus,
    ) -> Result<Option<Invoice>, InvoiceError> {
      self.inner.update_status(id, status).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Invoice>, InvoiceError> {
      InvoiceRepository::find_by_id(&*self.inner, id).await
    }

    async fn list(&self, client_id: Option<i64>) -> Result<Vec<Invoice>, InvoiceError> {
      InvoiceRepository::list(&*self.inner, client_id).await
    }

    async fn list_invoice_numbers_for_client(
      &self,
      client_id: i64,
    ) -> Result<Vec<String>, InvoiceError> {
      self.inner.list_invoice_numbers_for_client(client_id).await
    }

    async fn count_for_client(&self, client_id: i64) -> Result<usize, InvoiceError> {
      self.inner.count_for_client(client_id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, InvoiceError> {
      InvoiceRepository::delete(&*self.inner, id).await
    }
  }

  fn service_with(db: Arc<InMemoryDatabase>, notifier: Arc<dyn NotificationGateway>) -> InvoiceService {
    InvoiceService::new(
      InvoiceServiceDependencies {
        client_repo: db.clone(),
        invoice_repo: db.clone(),
        settings_repo: db,
        notifier,
      },
      InvoiceServiceConfig {
        notification_timeout: Duration::from_millis(100),
        default_payment_days: 14,
      },
    )
  }

  fn service() -> (InvoiceService, Arc<InMemoryDatabase>) {
    let db = Arc::new(InMemoryDatabase::new());
    (service_with(db.clone(), Arc::new(RecordingGateway::default())), db)
  }

  fn details(name: &str) -> ClientDetails {
    ClientDetails {
      name: ClientName::new(name.to_string()).unwrap(),
      address: None,
      email: None,
      phone: None,
      category: None,
    }
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn item(quantity: Decimal, rate: Decimal) -> LineItemData {
    LineItemData {
      description: LineItemDescription::new("Consulting".to_string()).unwrap(),
      quantity: Quantity::new(quantity).unwrap(),
      rate: Rate::new(rate).unwrap(),
    }
  }

  fn data(client_id: i64, number: Option<&str>) -> InvoiceData {
    InvoiceData {
      client_id,
      invoice_number: number.map(str::to_string),
      date_issued: date(2026, 3, 1),
      due_date: Some(date(2026, 3, 15)),
      vat_exempt: false,
      vat_exempt_reason: None,
      line_items: vec![item(dec!(2), dec!(50.00)), item(dec!(1), dec!(25.00))],
    }
  }

  #[tokio::test]
  async fn test_next_number_reference_scenario() {
    let (service, _db) = service();
    let client = service.create_client(details("C1")).await.unwrap();
    service.create_invoice(data(client.id, Some("C1-1"))).await.unwrap();
    service.create_invoice(data(client.id, Some("C1-2"))).await.unwrap();

    assert_eq!(service.next_invoice_number(client.id).await.unwrap(), "C1-3");
  }

  #[tokio::test]
  async fn test_next_number_unknown_client() {
    let (service, _db) = service();
    let err = service.next_invoice_number(999).await.unwrap_err();
    assert!(matches!(err, InvoiceError::ClientNotFound(999)));
  }

  #[tokio::test]
  async fn test_numbering_is_isolated_per_client() {
    let (service, _db) = service();
    let a = service.create_client(details("X")).await.unwrap();
    let b = service.create_client(details("X")).await.unwrap();

    let first_a = service.create_invoice(data(a.id, None)).await.unwrap();
    let first_b = service.create_invoice(data(b.id, None)).await.unwrap();

    assert_eq!(first_a.invoice_number.value(), "X-1");
    assert_eq!(first_b.invoice_number.value(), "X-1");
  }

  #[tokio::test]
  async fn test_duplicate_number_for_same_client_conflicts() {
    let (service, _db) = service();
    let client = service.create_client(details("Acme")).await.unwrap();
    service.create_invoice(data(client.id, Some("ACM-1"))).await.unwrap();

    let err = service
      .create_invoice(data(client.id, Some("ACM-1")))
      .await
      .unwrap_err();
    assert!(err.is_number_conflict());
  }

  #[tokio::test]
  async fn test_concurrent_generation_yields_unique_numbers() {
    let (service, _db) = service();
    let service = Arc::new(service);
    let client = service.create_client(details("Acme")).await.unwrap();

    let handles: Vec<_> = (0..10)
      .map(|_| {
        let service = service.clone();
        let client_id = client.id;
        tokio::spawn(async move { service.create_invoice(data(client_id, None)).await })
      })
      .collect();

    let mut numbers = Vec::new();
    for handle in handles {
      numbers.push(handle.await.unwrap().unwrap().invoice_number.into_inner());
    }
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 10);
    assert_eq!(service.next_invoice_number(client.id).await.unwrap(), "ACM-11");
  }

  #[tokio::test]
  async fn test_create_computes_total_with_settings_vat() {
    let (service, _db) = service();
    let client = service.create_client(details("Acme")).await.unwrap();
    let invoice = service.create_invoice(data(client.id, None)).await.unwrap();

    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.items.len(), 2);
    assert_eq!(invoice.items[0].amount, dec!(100.00));
    assert_eq!(invoice.total_amount, dec!(138.75));
  }

  #[tokio::test]
  async fn test_create_applies_defaults() {
    let (service, _db) = service();
    let mut settings = service.get_settings().await.unwrap();
    settings.default_vat_exempt_reason = "Art. 44 reverse charge".to_string();
    service.update_settings(settings).await.unwrap();

    let client = service.create_client(details("Acme")).await.unwrap();
    let mut input = data(client.id, None);
    input.due_date = None;
    input.vat_exempt = true;

    let invoice = service.create_invoice(input).await.unwrap();
    assert_eq!(invoice.due_date, date(2026, 3, 15));
    assert_eq!(
      invoice.vat_exempt_reason.as_deref(),
      Some("Art. 44 reverse charge")
    );
    assert_eq!(invoice.total_amount, dec!(125.00));
  }

  #[tokio::test]
  async fn test_due_date_before_issue_date_rejected() {
    let (service, _db) = service();
    let client = service.create_client(details("Acme")).await.unwrap();
    let mut input = data(client.id, None);
    input.due_date = Some(date(2026, 2, 1));

    let err = service.create_invoice(input).await.unwrap_err();
    assert!(matches!(err, InvoiceError::DueDateBeforeIssueDate { .. }));
  }

  #[tokio::test]
  async fn test_update_replaces_items_and_keeps_status() {
    let (service, _db) = service();
    let client = service.create_client(details("Acme")).await.unwrap();
    let invoice = service.create_invoice(data(client.id, None)).await.unwrap();
    service
      .set_status(invoice.id, InvoiceStatus::Paid)
      .await
      .unwrap();

    let mut input = data(client.id, None);
    input.line_items = vec![item(dec!(1), dec!(10))];
    let updated = service.update_invoice(invoice.id, input).await.unwrap();

    assert_eq!(updated.status, InvoiceStatus::Paid);
    assert_eq!(updated.invoice_number, invoice.invoice_number);
    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.total_amount, dec!(11.10));
  }

  #[tokio::test]
  async fn test_status_change_during_edit_is_kept() {
    let db = Arc::new(InMemoryDatabase::new());
    let reached = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let service = Arc::new(InvoiceService::new(
      InvoiceServiceDependencies {
        client_repo: db.clone(),
        invoice_repo: Arc::new(GatedInvoices {
          inner: db.clone(),
          reached: reached.clone(),
          release: release.clone(),
        }),
        settings_repo: db,
        notifier: Arc::new(RecordingGateway::default()),
      },
      InvoiceServiceConfig::default(),
    ));
    let client = service.create_client(details("Acme")).await.unwrap();
    let invoice_id = service.create_invoice(data(client.id, None)).await.unwrap().id;

    let edit = {
      let service = service.clone();
      let mut input = data(client.id, None);
      input.line_items = vec![item(dec!(1), dec!(10))];
      tokio::spawn(async move { service.update_invoice(invoice_id, input).await })
    };

    // The edit has read the Draft invoice and is about to write.
    reached.notified().await;
    service.mark_paid(invoice_id).await.unwrap();
    release.notify_one();

    let edited = edit.await.unwrap().unwrap();
    assert_eq!(edited.status, InvoiceStatus::Paid);
    assert_eq!(edited.total_amount, dec!(11.10));
    assert_eq!(
      service.get_invoice(invoice_id).await.unwrap().status,
      InvoiceStatus::Paid
    );
  }

  #[tokio::test]
  async fn test_create_rejects_amounts_beyond_range() {
    let (service, _db) = service();
    let client = service.create_client(details("Acme")).await.unwrap();
    let huge = Decimal::from(10_000_000_000_000_000u64);
    let mut input = data(client.id, None);
    input.line_items = vec![item(huge, huge)];

    let err = service.create_invoice(input).await.unwrap_err();
    assert!(matches!(
      err,
      InvoiceError::Validation(ValueObjectError::AmountOutOfRange(_))
    ));
    let stored = service.list_invoices(None, None, date(2026, 3, 1)).await.unwrap();
    assert!(stored.is_empty());
  }

  #[tokio::test]
  async fn test_display_status_scenario() {
    let (service, _db) = service();
    let client = service.create_client(details("Acme")).await.unwrap();
    let invoice = service.create_invoice(data(client.id, None)).await.unwrap();
    let today = date(2026, 3, 16);

    let sent = service
      .set_status(invoice.id, InvoiceStatus::Sent)
      .await
      .unwrap();
    assert_eq!(sent.display_status(today), DisplayStatus::Overdue);
    assert_eq!(sent.status, InvoiceStatus::Sent);

    let overdue = service
      .list_invoices(None, Some(DisplayStatus::Overdue), today)
      .await
      .unwrap();
    assert_eq!(overdue.len(), 1);

    let paid = service
      .set_status(invoice.id, InvoiceStatus::Paid)
      .await
      .unwrap();
    assert_eq!(paid.display_status(today), DisplayStatus::Paid);
  }

  #[tokio::test]
  async fn test_set_status_allows_override_and_reports_missing() {
    let (service, _db) = service();
    let client = service.create_client(details("Acme")).await.unwrap();
    let invoice = service.create_invoice(data(client.id, None)).await.unwrap();

    service
      .set_status(invoice.id, InvoiceStatus::Paid)
      .await
      .unwrap();
    let back = service
      .set_status(invoice.id, InvoiceStatus::Draft)
      .await
      .unwrap();
    assert_eq!(back.status, InvoiceStatus::Draft);

    let err = service
      .set_status(404, InvoiceStatus::Sent)
      .await
      .unwrap_err();
    assert!(matches!(err, InvoiceError::InvoiceNotFound(404)));
  }

  #[tokio::test]
  async fn test_mark_paid_delivers_notification() {
    let db = Arc::new(InMemoryDatabase::new());
    let gateway = Arc::new(RecordingGateway::default());
    let service = service_with(db, gateway.clone());

    let mut settings = service.get_settings().await.unwrap();
    settings.webhook_url = Some("https://hooks.example.com/abc".to_string());
    service.update_settings(settings).await.unwrap();

    let client = service.create_client(details("Acme")).await.unwrap();
    let invoice = service.create_invoice(data(client.id, None)).await.unwrap();

    let change = service.mark_paid(invoice.id).await.unwrap();
    assert_eq!(change.invoice.status, InvoiceStatus::Paid);
    assert_eq!(change.notification, NotificationOutcome::Delivered);

    let delivered = gateway.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].webhook_url, "https://hooks.example.com/abc");
    assert!(delivered[0].content.contains("ACM-1"));
  }

  #[tokio::test]
  async fn test_mark_paid_without_webhook_skips() {
    let (service, _db) = service();
    let client = service.create_client(details("Acme")).await.unwrap();
    let invoice = service.create_invoice(data(client.id, None)).await.unwrap();

    let change = service.mark_paid(invoice.id).await.unwrap();
    assert_eq!(change.notification, NotificationOutcome::Skipped);
  }

  #[tokio::test]
  async fn test_mark_paid_survives_failing_and_hanging_gateways() {
    for gateway in [
      Arc::new(FailingGateway) as Arc<dyn NotificationGateway>,
      Arc::new(HangingGateway),
    ] {
      let db = Arc::new(InMemoryDatabase::new());
      let service = service_with(db, gateway);
      let mut settings = service.get_settings().await.unwrap();
      settings.webhook_url = Some("https://hooks.example.com/abc".to_string());
      service.update_settings(settings).await.unwrap();

      let client = service.create_client(details("Acme")).await.unwrap();
      let invoice = service.create_invoice(data(client.id, None)).await.unwrap();

      let change = tokio::time::timeout(Duration::from_secs(5), service.mark_paid(invoice.id))
        .await
        .expect("mark_paid must not wait on the gateway beyond its timeout")
        .unwrap();

      assert_eq!(change.invoice.status, InvoiceStatus::Paid);
      assert!(matches!(change.notification, NotificationOutcome::Failed(_)));
      assert_eq!(
        service.get_invoice(invoice.id).await.unwrap().status,
        InvoiceStatus::Paid
      );
    }
  }

  #[tokio::test]
  async fn test_delete_client_with_invoices_rejected() {
    let (service, _db) = service();
    let client = service.create_client(details("Acme")).await.unwrap();
    let invoice = service.create_invoice(data(client.id, None)).await.unwrap();

    let err = service.delete_client(client.id).await.unwrap_err();
    assert!(matches!(
      err,
      InvoiceError::ClientHasInvoices {
        invoice_count: 1,
        ..
      }
    ));

    service.delete_invoice(invoice.id).await.unwrap();
    service.delete_client(client.id).await.unwrap();
    assert!(matches!(
      service.get_client(client.id).await.unwrap_err(),
      InvoiceError::ClientNotFound(_)
    ));
  }

  #[tokio::test]
  async fn test_update_settings_rejects_bad_vat() {
    let (service, _db) = service();
    let mut settings = service.get_settings().await.unwrap();
    settings.vat_percentage = "eleven".to_string();
    assert!(matches!(
      service.update_settings(settings).await.unwrap_err(),
      InvoiceError::Validation(_)
    ));
  }
}
