use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::invoice::{Invoice, InvoiceError, InvoiceService, LineItem};

#[derive(Debug, Deserialize)]
pub struct GetInvoiceDetailsCommand {
  pub invoice_id: i64,
  pub today: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct InvoiceLineItemDto {
  pub id: i64,
  pub description: String,
  pub quantity: Decimal,
  pub rate: Decimal,
  pub amount: Decimal,
}

impl From<LineItem> for InvoiceLineItemDto {
  fn from(item: LineItem) -> Self {
    Self {
      id: item.id,
      description: item.description.value().to_string(),
      quantity: item.quantity.value(),
      rate: item.rate.value(),
      amount: item.amount,
    }
  }
}

/// Full invoice view. `status` is the stored value, `display_status` the
/// value to show (`Overdue` for a sent invoice past its due date).
#[derive(Debug, Serialize)]
pub struct InvoiceDetailsResponse {
  pub id: i64,
  pub client_id: i64,
  pub invoice_number: String,
  pub date_issued: NaiveDate,
  pub due_date: NaiveDate,
  pub status: String,
  pub display_status: String,
  pub vat_exempt: bool,
  pub vat_exempt_reason: Option<String>,
  pub line_items: Vec<InvoiceLineItemDto>,
  pub subtotal: Decimal,
  pub vat_amount: Decimal,
  pub total_amount: Decimal,
}

impl InvoiceDetailsResponse {
  pub fn from_invoice(invoice: Invoice, today: NaiveDate) -> Self {
    let display_status = invoice.display_status(today);
    let subtotal: Decimal = invoice.items.iter().map(|item| item.amount).sum();

    Self {
      id: invoice.id,
      client_id: invoice.client_id,
      invoice_number: invoice.invoice_number.into_inner(),
      date_issued: invoice.date_issued,
      due_date: invoice.due_date,
      status: invoice.status.as_str().to_string(),
      display_status: display_status.as_str().to_string(),
      vat_exempt: invoice.vat_exempt,
      vat_exempt_reason: invoice.vat_exempt_reason,
      line_items: invoice.items.into_iter().map(Into::into).collect(),
      subtotal,
      // The stored total was computed with the VAT rate in force when saved.
      vat_amount: invoice.total_amount - subtotal,
      total_amount: invoice.total_amount,
    }
  }
}

pub struct GetInvoiceDetailsUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetInvoiceDetailsUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: GetInvoiceDetailsCommand,
  ) -> Result<InvoiceDetailsResponse, InvoiceError> {
    let invoice = self.invoice_service.get_invoice(command.invoice_id).await?;
    Ok(InvoiceDetailsResponse::from_invoice(invoice, command.today))
  }
}
