//! Portable snapshot document used for backup and restore.
//!
//! The document mirrors the dataset with plain scalar fields (dates as ISO
//! strings, ids as integers) so that it stays human-diffable and can be
//! checked in full before anything touches live storage. Field order in the
//! serialized form follows declaration order below.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::entities::Dataset;
use super::errors::{BackupError, SnapshotViolation};
use crate::domain::invoice::entities::{
  Client, Invoice, LineItem, MAX_CATEGORY_CHARS, MAX_EMAIL_CHARS, MAX_PHONE_CHARS, Settings,
};
use crate::domain::invoice::value_objects::{
  ClientName, InvoiceNumber, InvoiceStatus, LineItemDescription, Quantity, Rate,
};

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
  pub format_version: u32,
  pub exported_at: DateTime<Utc>,
  pub settings: Settings,
  pub clients: Vec<SnapshotClient>,
  pub invoices: Vec<SnapshotInvoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotClient {
  pub id: i64,
  pub name: String,
  pub address: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub category: Option<String>,
  pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotInvoice {
  pub id: i64,
  pub client_id: i64,
  pub invoice_number: String,
  pub date_issued: String,
  pub due_date: String,
  pub status: String,
  pub vat_exempt: bool,
  pub vat_exempt_reason: Option<String>,
  pub total_amount: Decimal,
  pub line_items: Vec<SnapshotLineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLineItem {
  pub id: i64,
  pub invoice_id: i64,
  pub description: String,
  pub quantity: Decimal,
  pub rate: Decimal,
  pub amount: Decimal,
}

impl SnapshotDocument {
  pub fn from_dataset(dataset: Dataset, exported_at: DateTime<Utc>) -> Self {
    Self {
      format_version: SNAPSHOT_FORMAT_VERSION,
      exported_at,
      settings: dataset.settings,
      clients: dataset.clients.into_iter().map(SnapshotClient::from).collect(),
      invoices: dataset
        .invoices
        .into_iter()
        .map(SnapshotInvoice::from)
        .collect(),
    }
  }

  /// Parses a document. Only structural problems are reported here; content
  /// checks happen in [`SnapshotDocument::validate`].
  pub fn from_json(bytes: &[u8]) -> Result<Self, BackupError> {
    let document: Self =
      serde_json::from_slice(bytes).map_err(|e| BackupError::Malformed(e.to_string()))?;
    if document.format_version != SNAPSHOT_FORMAT_VERSION {
      return Err(BackupError::Malformed(format!(
        "unsupported format_version {} (expected {})",
        document.format_version, SNAPSHOT_FORMAT_VERSION
      )));
    }
    Ok(document)
  }

  pub fn to_json_pretty(&self) -> Result<String, BackupError> {
    serde_json::to_string_pretty(self).map_err(|e| BackupError::Malformed(e.to_string()))
  }

  /// Checks the whole document and converts it into a dataset. Every
  /// violation found is reported, not only the first.
  pub fn validate(&self) -> Result<Dataset, BackupError> {
    let mut violations = Vec::new();

    if let Err(e) = self.settings.vat_percentage() {
      violations.push(SnapshotViolation::new(
        "settings",
        None,
        "vat_percentage",
        e.to_string(),
      ));
    }

    let mut client_ids = HashSet::new();
    let mut clients = Vec::with_capacity(self.clients.len());
    for client in &self.clients {
      if !client_ids.insert(client.id) {
        violations.push(SnapshotViolation::new(
          "client",
          Some(client.id),
          "id",
          "duplicate client id",
        ));
      }
      if let Some(client) = client.to_domain(&mut violations) {
        clients.push(client);
      }
    }

    let mut invoice_ids = HashSet::new();
    let mut line_item_ids = HashSet::new();
    let mut numbers_by_client: HashMap<i64, HashSet<&str>> = HashMap::new();
    let mut invoices = Vec::with_capacity(self.invoices.len());
    for invoice in &self.invoices {
      if !invoice_ids.insert(invoice.id) {
        violations.push(SnapshotViolation::new(
          "invoice",
          Some(invoice.id),
          "id",
          "duplicate invoice id",
        ));
      }
      if !client_ids.contains(&invoice.client_id) {
        violations.push(SnapshotViolation::new(
          "invoice",
          Some(invoice.id),
          "client_id",
          format!("references missing client {}", invoice.client_id),
        ));
      }
      let numbers = numbers_by_client.entry(invoice.client_id).or_default();
      if !numbers.insert(invoice.invoice_number.trim()) {
        violations.push(SnapshotViolation::new(
          "invoice",
          Some(invoice.id),
          "invoice_number",
          format!(
            "'{}' is used more than once for client {}",
            invoice.invoice_number, invoice.client_id
          ),
        ));
      }
      for item in &invoice.line_items {
        if !line_item_ids.insert(item.id) {
          violations.push(SnapshotViolation::new(
            "line_item",
            Some(item.id),
            "id",
            "duplicate line item id",
          ));
        }
      }
      if let Some(invoice) = invoice.to_domain(&mut violations) {
        invoices.push(invoice);
      }
    }

    if !violations.is_empty() {
      return Err(BackupError::Integrity(violations));
    }

    Ok(Dataset {
      settings: self.settings.clone(),
      clients,
      invoices,
    })
  }
}

impl From<Client> for SnapshotClient {
  fn from(client: Client) -> Self {
    Self {
      id: client.id,
      name: client.name.value().to_string(),
      address: client.address,
      email: client.email,
      phone: client.phone,
      category: client.category,
      created_at: client
        .created_at
        .to_rfc3339_opts(SecondsFormat::AutoSi, true),
    }
  }
}

impl SnapshotClient {
  fn to_domain(&self, violations: &mut Vec<SnapshotViolation>) -> Option<Client> {
    let violation = |field, message: String| SnapshotViolation::new("client", Some(self.id), field, message);

    let name = ClientName::new(self.name.clone())
      .map_err(|e| violations.push(violation("name", e.to_string())))
      .ok();
    let created_at = DateTime::parse_from_rfc3339(&self.created_at)
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(|e| violations.push(violation("created_at", format!("'{}': {}", self.created_at, e))))
      .ok();

    let mut within_limits = true;
    for (field, value, max) in [
      ("email", &self.email, MAX_EMAIL_CHARS),
      ("phone", &self.phone, MAX_PHONE_CHARS),
      ("category", &self.category, MAX_CATEGORY_CHARS),
    ] {
      if value.as_ref().is_some_and(|v| v.chars().count() > max) {
        violations.push(violation(field, format!("must not exceed {} characters", max)));
        within_limits = false;
      }
    }
    if !within_limits {
      return None;
    }

    Some(Client {
      id: self.id,
      name: name?,
      address: self.address.clone(),
      email: self.email.clone(),
      phone: self.phone.clone(),
      category: self.category.clone(),
      created_at: created_at?,
    })
  }
}

impl From<Invoice> for SnapshotInvoice {
  fn from(invoice: Invoice) -> Self {
    Self {
      id: invoice.id,
      client_id: invoice.client_id,
      invoice_number: invoice.invoice_number.into_inner(),
      date_issued: invoice.date_issued.format(DATE_FORMAT).to_string(),
      due_date: invoice.due_date.format(DATE_FORMAT).to_string(),
      status: invoice.status.as_str().to_string(),
      vat_exempt: invoice.vat_exempt,
      vat_exempt_reason: invoice.vat_exempt_reason,
      total_amount: invoice.total_amount,
      line_items: invoice.items.into_iter().map(SnapshotLineItem::from).collect(),
    }
  }
}

impl SnapshotInvoice {
  fn to_domain(&self, violations: &mut Vec<SnapshotViolation>) -> Option<Invoice> {
    let violation =
      |field, message: String| SnapshotViolation::new("invoice", Some(self.id), field, message);
    let mut valid = true;

    let invoice_number = InvoiceNumber::new(self.invoice_number.clone())
      .map_err(|e| violations.push(violation("invoice_number", e.to_string())))
      .ok();
    let date_issued = parse_date(&self.date_issued)
      .map_err(|e| violations.push(violation("date_issued", e)))
      .ok();
    let due_date = parse_date(&self.due_date)
      .map_err(|e| violations.push(violation("due_date", e)))
      .ok();
    if let (Some(issued), Some(due)) = (date_issued, due_date) {
      if due < issued {
        violations.push(violation(
          "due_date",
          format!("{} is before issue date {}", due, issued),
        ));
        valid = false;
      }
    }
    let status = self
      .status
      .parse::<InvoiceStatus>()
      .map_err(|e| violations.push(violation("status", e.to_string())))
      .ok();
    if self.total_amount.is_sign_negative() && !self.total_amount.is_zero() {
      violations.push(violation("total_amount", "must not be negative".to_string()));
      valid = false;
    }

    let mut items = Vec::with_capacity(self.line_items.len());
    for item in &self.line_items {
      if item.invoice_id != self.id {
        violations.push(SnapshotViolation::new(
          "line_item",
          Some(item.id),
          "invoice_id",
          format!(
            "references invoice {} but is nested in invoice {}",
            item.invoice_id, self.id
          ),
        ));
        valid = false;
        continue;
      }
      match item.to_domain(violations) {
        Some(item) => items.push(item),
        None => valid = false,
      }
    }

    if !valid {
      return None;
    }

    Some(Invoice {
      id: self.id,
      client_id: self.client_id,
      invoice_number: invoice_number?,
      date_issued: date_issued?,
      due_date: due_date?,
      status: status?,
      vat_exempt: self.vat_exempt,
      vat_exempt_reason: self.vat_exempt_reason.clone(),
      items,
      total_amount: self.total_amount,
    })
  }
}

impl From<LineItem> for SnapshotLineItem {
  fn from(item: LineItem) -> Self {
    Self {
      id: item.id,
      invoice_id: item.invoice_id,
      description: item.description.value().to_string(),
      quantity: item.quantity.value(),
      rate: item.rate.value(),
      amount: item.amount,
    }
  }
}

impl SnapshotLineItem {
  fn to_domain(&self, violations: &mut Vec<SnapshotViolation>) -> Option<LineItem> {
    let violation =
      |field, message: String| SnapshotViolation::new("line_item", Some(self.id), field, message);

    let description = LineItemDescription::new(self.description.clone())
      .map_err(|e| violations.push(violation("description", e.to_string())))
      .ok();
    let quantity = Quantity::new(self.quantity)
      .map_err(|e| violations.push(violation("quantity", e.to_string())))
      .ok();
    let rate = Rate::new(self.rate)
      .map_err(|e| violations.push(violation("rate", e.to_string())))
      .ok();
    if self.amount.is_sign_negative() && !self.amount.is_zero() {
      violations.push(violation("amount", "must not be negative".to_string()));
      return None;
    }

    Some(LineItem {
      id: self.id,
      invoice_id: self.invoice_id,
      description: description?,
      quantity: quantity?,
      rate: rate?,
      amount: self.amount,
    })
  }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
  NaiveDate::parse_from_str(value, DATE_FORMAT)
    .map_err(|e| format!("'{}' is not a YYYY-MM-DD date: {}", value, e))
}
