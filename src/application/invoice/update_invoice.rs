use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use super::create_invoice::InvoiceLineItemInput;
use super::get_invoice_details::InvoiceDetailsResponse;
use crate::domain::invoice::{InvoiceData, InvoiceError, InvoiceService};

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceCommand {
  pub invoice_id: i64,
  pub client_id: i64,
  /// Keeps the current number when absent.
  pub invoice_number: Option<String>,
  pub date_issued: NaiveDate,
  pub due_date: Option<NaiveDate>,
  #[serde(default)]
  pub vat_exempt: bool,
  pub vat_exempt_reason: Option<String>,
  /// Replaces the stored item list as a whole.
  #[serde(default)]
  pub line_items: Vec<InvoiceLineItemInput>,
  pub today: NaiveDate,
}

pub struct UpdateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl UpdateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: UpdateInvoiceCommand,
  ) -> Result<InvoiceDetailsResponse, InvoiceError> {
    let line_items = command
      .line_items
      .into_iter()
      .map(InvoiceLineItemInput::into_data)
      .collect::<Result<Vec<_>, InvoiceError>>()?;

    let invoice = self
      .invoice_service
      .update_invoice(
        command.invoice_id,
        InvoiceData {
          client_id: command.client_id,
          invoice_number: command.invoice_number.filter(|n| !n.trim().is_empty()),
          date_issued: command.date_issued,
          due_date: command.due_date,
          vat_exempt: command.vat_exempt,
          vat_exempt_reason: command.vat_exempt_reason,
          line_items,
        },
      )
      .await?;

    Ok(InvoiceDetailsResponse::from_invoice(invoice, command.today))
  }
}
