use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid invoice number: {0}")]
  InvalidInvoiceNumber(String),
  #[error("Invalid quantity: {0}")]
  InvalidQuantity(String),
  #[error("Invalid rate: {0}")]
  InvalidRate(String),
  #[error("Invalid VAT percentage: {0}")]
  InvalidVatPercentage(String),
  #[error("Invalid client name: {0}")]
  InvalidClientName(String),
  #[error("Invalid line item description: {0}")]
  InvalidDescription(String),
  #[error("Invalid status: {0}")]
  InvalidStatus(String),
  #[error("Amount out of range: {0}")]
  AmountOutOfRange(String),
}

// Invoice Number - unique within the owning client only
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 100 {
      return Err(ValueObjectError::InvalidInvoiceNumber(
        "Invoice number cannot exceed 100 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for InvoiceNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Stored invoice status. `Overdue` is deliberately absent: it is only ever
/// derived at read time, see [`DisplayStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
  Draft,
  Sent,
  Paid,
}

impl InvoiceStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceStatus::Draft => "Draft",
      InvoiceStatus::Sent => "Sent",
      InvoiceStatus::Paid => "Paid",
    }
  }
}

impl FromStr for InvoiceStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "draft" => Ok(InvoiceStatus::Draft),
      "sent" => Ok(InvoiceStatus::Sent),
      "paid" => Ok(InvoiceStatus::Paid),
      "overdue" => Err(ValueObjectError::InvalidStatus(
        "Overdue is derived from the due date and cannot be assigned".to_string(),
      )),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown status: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for InvoiceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Status as presented to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayStatus {
  Draft,
  Sent,
  Paid,
  Overdue,
}

impl DisplayStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      DisplayStatus::Draft => "Draft",
      DisplayStatus::Sent => "Sent",
      DisplayStatus::Paid => "Paid",
      DisplayStatus::Overdue => "Overdue",
    }
  }
}

impl From<InvoiceStatus> for DisplayStatus {
  fn from(status: InvoiceStatus) -> Self {
    match status {
      InvoiceStatus::Draft => DisplayStatus::Draft,
      InvoiceStatus::Sent => DisplayStatus::Sent,
      InvoiceStatus::Paid => DisplayStatus::Paid,
    }
  }
}

impl FromStr for DisplayStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "overdue" => Ok(DisplayStatus::Overdue),
      other => InvoiceStatus::from_str(other).map(DisplayStatus::from),
    }
  }
}

impl fmt::Display for DisplayStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// Quantity - non-negative, up to 4 decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(Decimal);

impl Quantity {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value.is_sign_negative() && !value.is_zero() {
      return Err(ValueObjectError::InvalidQuantity(
        "Quantity cannot be negative".to_string(),
      ));
    }
    if value.scale() > 4 {
      return Err(ValueObjectError::InvalidQuantity(
        "Quantity cannot have more than 4 decimal places".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

// Rate - non-negative unit price in the single invoicing currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate(Decimal);

impl Rate {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value.is_sign_negative() && !value.is_zero() {
      return Err(ValueObjectError::InvalidRate(
        "Rate cannot be negative".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

// VAT percentage, e.g. 11 for 11%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatPercentage(Decimal);

impl VatPercentage {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value.is_sign_negative() || value > Decimal::from(100) {
      return Err(ValueObjectError::InvalidVatPercentage(
        "VAT percentage must be between 0 and 100".to_string(),
      ));
    }
    Ok(Self(value))
  }

  /// Parses the decimal-as-string form kept in settings.
  pub fn parse(value: &str) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim().trim_end_matches('%').trim();
    let decimal = Decimal::from_str(trimmed).map_err(|_| {
      ValueObjectError::InvalidVatPercentage(format!("Not a decimal number: {}", value))
    })?;
    Self::new(decimal)
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

// Client Name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientName(String);

impl ClientName {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidClientName(
        "Client name cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 255 {
      return Err(ValueObjectError::InvalidClientName(
        "Client name cannot exceed 255 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  /// Short upper-case code used as the default invoice number prefix.
  pub fn code(&self) -> String {
    self
      .0
      .chars()
      .filter(|c| c.is_ascii_alphanumeric())
      .take(3)
      .collect::<String>()
      .to_uppercase()
  }
}

impl fmt::Display for ClientName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Line Item Description - free text, may be empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemDescription(String);

impl LineItemDescription {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.len() > 500 {
      return Err(ValueObjectError::InvalidDescription(
        "Description cannot exceed 500 characters".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_invoice_number_trims_and_rejects_empty() {
    assert_eq!(
      InvoiceNumber::new("  ACM-1 ".to_string()).unwrap().value(),
      "ACM-1"
    );
    assert!(InvoiceNumber::new("   ".to_string()).is_err());
    assert!(InvoiceNumber::new("x".repeat(101)).is_err());
  }

  #[test]
  fn test_status_parsing_accepts_storable_values_only() {
    assert_eq!(InvoiceStatus::from_str("Draft"), Ok(InvoiceStatus::Draft));
    assert_eq!(InvoiceStatus::from_str("sent"), Ok(InvoiceStatus::Sent));
    assert_eq!(InvoiceStatus::from_str("PAID"), Ok(InvoiceStatus::Paid));
    assert!(InvoiceStatus::from_str("Overdue").is_err());
    assert!(InvoiceStatus::from_str("Cancelled").is_err());
  }

  #[test]
  fn test_display_status_parsing_includes_overdue() {
    assert_eq!(
      DisplayStatus::from_str("overdue"),
      Ok(DisplayStatus::Overdue)
    );
    assert_eq!(DisplayStatus::from_str("Paid"), Ok(DisplayStatus::Paid));
    assert!(DisplayStatus::from_str("All").is_err());
  }

  #[test]
  fn test_quantity_and_rate_reject_negatives() {
    assert!(Quantity::new(dec!(0)).is_ok());
    assert!(Quantity::new(dec!(1.5)).is_ok());
    assert!(Quantity::new(dec!(-1)).is_err());
    assert!(Quantity::new(dec!(0.00001)).is_err());
    assert!(Rate::new(dec!(0)).is_ok());
    assert!(Rate::new(dec!(-0.01)).is_err());
  }

  #[test]
  fn test_vat_percentage_parse() {
    assert_eq!(VatPercentage::parse("11").unwrap().value(), dec!(11));
    assert_eq!(VatPercentage::parse(" 7.5% ").unwrap().value(), dec!(7.5));
    assert!(VatPercentage::parse("abc").is_err());
    assert!(VatPercentage::parse("101").is_err());
    assert!(VatPercentage::parse("-1").is_err());
  }

  #[test]
  fn test_client_code() {
    let name = ClientName::new("Envato Pty".to_string()).unwrap();
    assert_eq!(name.code(), "ENV");

    let name = ClientName::new("c1".to_string()).unwrap();
    assert_eq!(name.code(), "C1");

    let name = ClientName::new("— —".to_string()).unwrap();
    assert_eq!(name.code(), "");
  }
}
