use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status;
use super::value_objects::{
  ClientName, DisplayStatus, InvoiceNumber, InvoiceStatus, LineItemDescription, Quantity, Rate,
  ValueObjectError, VatPercentage,
};

// Client - invoice recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
  pub id: i64,
  pub name: ClientName,
  pub address: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub category: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl Client {
  pub fn update(&mut self, details: ClientDetails) {
    self.name = details.name;
    self.address = details.address;
    self.email = details.email;
    self.phone = details.phone;
    self.category = details.category;
  }

  /// Prefix used for this client's invoice numbers when no pattern exists yet.
  pub fn invoice_prefix(&self) -> String {
    let code = self.name.code();
    if code.is_empty() {
      format!("C{}-", self.id)
    } else {
      format!("{}-", code)
    }
  }
}

/// Editable client fields; the id and creation time are assigned by the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDetails {
  pub name: ClientName,
  pub address: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub category: Option<String>,
}

/// Longest accepted client contact fields, in characters.
pub const MAX_EMAIL_CHARS: usize = 255;
pub const MAX_PHONE_CHARS: usize = 50;
pub const MAX_CATEGORY_CHARS: usize = 100;

// Invoice Line Item - owned exclusively by its invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
  pub id: i64,
  pub invoice_id: i64,
  pub description: LineItemDescription,
  pub quantity: Quantity,
  pub rate: Rate,
  pub amount: Decimal,
}

/// Line item as submitted by a caller, amount already computed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
  pub description: LineItemDescription,
  pub quantity: Quantity,
  pub rate: Rate,
  pub amount: Decimal,
}

// Invoice - main invoice document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: i64,
  pub client_id: i64,
  pub invoice_number: InvoiceNumber,
  pub date_issued: NaiveDate,
  pub due_date: NaiveDate,
  pub status: InvoiceStatus,
  pub vat_exempt: bool,
  pub vat_exempt_reason: Option<String>,
  pub items: Vec<LineItem>,
  pub total_amount: Decimal,
}

impl Invoice {
  pub fn display_status(&self, today: NaiveDate) -> DisplayStatus {
    status::display_status(self.status, self.due_date, today)
  }
}

/// Invoice fields prior to persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
  pub client_id: i64,
  pub invoice_number: InvoiceNumber,
  pub date_issued: NaiveDate,
  pub due_date: NaiveDate,
  pub status: InvoiceStatus,
  pub vat_exempt: bool,
  pub vat_exempt_reason: Option<String>,
  pub items: Vec<NewLineItem>,
  pub total_amount: Decimal,
}

/// New content for a stored invoice. The item list replaces the stored one
/// as a whole. Carries no status: that only changes through
/// `InvoiceRepository::update_status`.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRevision {
  pub client_id: i64,
  pub invoice_number: InvoiceNumber,
  pub date_issued: NaiveDate,
  pub due_date: NaiveDate,
  pub vat_exempt: bool,
  pub vat_exempt_reason: Option<String>,
  pub items: Vec<NewLineItem>,
  pub total_amount: Decimal,
}

// Settings - singleton per dataset; absent fields fall back to the defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub sender_name: String,
  pub sender_address_line1: String,
  pub sender_address_line2: String,
  pub sender_address_line3: String,
  pub sender_email: String,
  pub sender_phone: String,
  pub tax_id: String,
  pub bank_iban: String,
  pub bank_account_holder: String,
  pub bank_swift: String,
  pub vat_percentage: String,
  pub default_vat_exempt_reason: String,
  pub webhook_url: Option<String>,
}

impl Settings {
  pub fn vat_percentage(&self) -> Result<VatPercentage, ValueObjectError> {
    VatPercentage::parse(&self.vat_percentage)
  }

  /// Webhook URL, if one is configured and non-blank.
  pub fn webhook_url(&self) -> Option<&str> {
    self
      .webhook_url
      .as_deref()
      .map(str::trim)
      .filter(|url| !url.is_empty())
  }
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      sender_name: "Your Name".to_string(),
      sender_address_line1: "Address Line 1".to_string(),
      sender_address_line2: "City".to_string(),
      sender_address_line3: "Country".to_string(),
      sender_email: "email@example.com".to_string(),
      sender_phone: "+1 234 567 890".to_string(),
      tax_id: String::new(),
      bank_iban: String::new(),
      bank_account_holder: String::new(),
      bank_swift: String::new(),
      vat_percentage: "11".to_string(),
      default_vat_exempt_reason: String::new(),
      webhook_url: None,
    }
  }
}
