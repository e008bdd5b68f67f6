use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

use super::get_invoice_details::InvoiceDetailsResponse;
use crate::domain::invoice::{
  InvoiceData, InvoiceError, InvoiceService, LineItemData, LineItemDescription, Quantity, Rate,
};

#[derive(Debug, Deserialize)]
pub struct InvoiceLineItemInput {
  #[serde(default)]
  pub description: String,
  pub quantity: Decimal,
  pub rate: Decimal,
}

impl InvoiceLineItemInput {
  pub(super) fn into_data(self) -> Result<LineItemData, InvoiceError> {
    Ok(LineItemData {
      description: LineItemDescription::new(self.description)?,
      quantity: Quantity::new(self.quantity)?,
      rate: Rate::new(self.rate)?,
    })
  }
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceCommand {
  pub client_id: i64,
  /// Generated from the client's numbering pattern when absent.
  pub invoice_number: Option<String>,
  /// Defaults to `today`.
  pub date_issued: Option<NaiveDate>,
  pub due_date: Option<NaiveDate>,
  #[serde(default)]
  pub vat_exempt: bool,
  pub vat_exempt_reason: Option<String>,
  #[serde(default)]
  pub line_items: Vec<InvoiceLineItemInput>,
  pub today: NaiveDate,
}

pub struct CreateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl CreateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: CreateInvoiceCommand,
  ) -> Result<InvoiceDetailsResponse, InvoiceError> {
    let line_items = command
      .line_items
      .into_iter()
      .map(InvoiceLineItemInput::into_data)
      .collect::<Result<Vec<_>, InvoiceError>>()?;

    let invoice_data = InvoiceData {
      client_id: command.client_id,
      invoice_number: command.invoice_number.filter(|n| !n.trim().is_empty()),
      date_issued: command.date_issued.unwrap_or(command.today),
      due_date: command.due_date,
      vat_exempt: command.vat_exempt,
      vat_exempt_reason: command.vat_exempt_reason,
      line_items,
    };

    let invoice = self.invoice_service.create_invoice(invoice_data).await?;
    Ok(InvoiceDetailsResponse::from_invoice(invoice, command.today))
  }
}
