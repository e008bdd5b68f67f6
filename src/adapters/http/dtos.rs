use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Client create/update body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClientRequest {
  #[validate(length(
    min = 1,
    max = 255,
    message = "Client name must be between 1 and 255 characters"
  ))]
  pub name: String,

  #[validate(length(max = 1000, message = "Address is too long"))]
  pub address: Option<String>,

  #[validate(
    email(message = "Invalid email format"),
    length(max = 255, message = "Email is too long")
  )]
  pub email: Option<String>,

  #[validate(length(max = 50, message = "Phone is too long"))]
  pub phone: Option<String>,

  #[validate(length(max = 100, message = "Category is too long"))]
  pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LineItemRequest {
  #[serde(default)]
  #[validate(length(max = 1000, message = "Line item description is too long"))]
  pub description: String,
  pub quantity: Decimal,
  pub rate: Decimal,
}

/// Invoice create/update body
///
/// An absent or blank `invoice_number` asks the server to generate the next
/// number for the client. On update it keeps the stored number.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InvoiceRequest {
  pub client_id: i64,

  #[validate(length(max = 100, message = "Invoice number is too long"))]
  pub invoice_number: Option<String>,

  /// Defaults to today on create.
  pub date_issued: Option<NaiveDate>,

  /// Defaults to `date_issued` plus the configured payment days.
  pub due_date: Option<NaiveDate>,

  #[serde(default)]
  pub vat_exempt: bool,

  pub vat_exempt_reason: Option<String>,

  #[serde(default)]
  #[validate(nested)]
  pub line_items: Vec<LineItemRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceListQuery {
  pub client_id: Option<i64>,
  pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NextNumberQuery {
  pub client_id: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusChangeRequest {
  #[validate(length(min = 1, message = "Status is required"))]
  pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TotalsLineRequest {
  pub quantity: Decimal,
  pub rate: Decimal,
}

/// Totals preview body; VAT falls back to the saved settings when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct TotalsRequest {
  #[serde(default)]
  pub items: Vec<TotalsLineRequest>,
  pub vat_percentage: Option<String>,
  #[serde(default)]
  pub vat_exempt: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SettingsRequest {
  #[serde(default)]
  pub sender_name: String,
  #[serde(default)]
  pub sender_address_line1: String,
  #[serde(default)]
  pub sender_address_line2: String,
  #[serde(default)]
  pub sender_address_line3: String,
  #[serde(default)]
  pub sender_email: String,
  #[serde(default)]
  pub sender_phone: String,
  #[serde(default)]
  pub tax_id: String,
  #[serde(default)]
  pub bank_iban: String,
  #[serde(default)]
  pub bank_account_holder: String,
  #[serde(default)]
  pub bank_swift: String,
  #[validate(length(min = 1, message = "VAT percentage is required"))]
  pub vat_percentage: String,
  #[serde(default)]
  pub default_vat_exempt_reason: String,
  pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TestWebhookRequest {
  #[validate(url(message = "Invalid webhook URL"))]
  pub webhook_url: Option<String>,
}

/// Standard success response for operations without data
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
  /// Success message
  pub message: String,
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
  /// Error type/code
  pub error: String,

  /// Human-readable error message
  pub message: String,

  /// Optional detailed error information
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;
  use validator::Validate;

  #[test]
  fn test_client_request_validation_valid() {
    let request = ClientRequest {
      name: "Acme".to_string(),
      address: None,
      email: Some("billing@acme.test".to_string()),
      phone: None,
      category: None,
    };

    assert!(request.validate().is_ok());
  }

  #[test]
  fn test_client_request_validation_invalid_email() {
    let request = ClientRequest {
      name: "Acme".to_string(),
      address: None,
      email: Some("not-an-email".to_string()),
      phone: None,
      category: None,
    };

    assert!(request.validate().is_err());
  }

  #[test]
  fn test_client_request_validation_empty_name() {
    let request = ClientRequest {
      name: String::new(),
      address: None,
      email: None,
      phone: None,
      category: None,
    };

    assert!(request.validate().is_err());
  }

  #[test]
  fn test_client_request_validation_field_lengths() {
    let request = ClientRequest {
      name: "Acme".to_string(),
      address: None,
      email: None,
      phone: Some("1".repeat(51)),
      category: Some("c".repeat(101)),
    };

    let errors = request.validate().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("phone"));
    assert!(fields.contains_key("category"));
  }

  #[test]
  fn test_invoice_request_defaults() {
    let json = r#"{"client_id": 3, "line_items": [{"quantity": "2", "rate": "50.00"}]}"#;
    let request: InvoiceRequest = serde_json::from_str(json).unwrap();

    assert!(request.invoice_number.is_none());
    assert!(request.date_issued.is_none());
    assert!(!request.vat_exempt);
    assert_eq!(request.line_items[0].description, "");
    assert_eq!(request.line_items[0].quantity, dec!(2));
    assert!(request.validate().is_ok());
  }

  #[test]
  fn test_test_webhook_request_rejects_bad_url() {
    let request = TestWebhookRequest {
      webhook_url: Some("not a url".to_string()),
    };
    assert!(request.validate().is_err());
    assert!(TestWebhookRequest::default().validate().is_ok());
  }
}
