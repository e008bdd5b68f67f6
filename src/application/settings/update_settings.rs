use serde::Deserialize;
use std::sync::Arc;

use crate::domain::invoice::{InvoiceError, InvoiceService, Settings};

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsCommand {
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

pub struct UpdateSettingsUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl UpdateSettingsUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  /// Last writer wins.
  pub async fn execute(&self, command: UpdateSettingsCommand) -> Result<Settings, InvoiceError> {
    let settings = Settings {
      sender_name: command.sender_name,
      sender_address_line1: command.sender_address_line1,
      sender_address_line2: command.sender_address_line2,
      sender_address_line3: command.sender_address_line3,
      sender_email: command.sender_email,
      sender_phone: command.sender_phone,
      tax_id: command.tax_id,
      bank_iban: command.bank_iban,
      bank_account_holder: command.bank_account_holder,
      bank_swift: command.bank_swift,
      vat_percentage: command.vat_percentage.trim().to_string(),
      default_vat_exempt_reason: command.default_vat_exempt_reason,
      webhook_url: command
        .webhook_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty()),
    };

    self.invoice_service.update_settings(settings).await
  }
}
