use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::invoice::{DisplayStatus, InvoiceError, InvoiceService};

#[derive(Debug, Deserialize)]
pub struct ListInvoicesCommand {
  pub client_filter: Option<i64>,
  /// Matches the display status, so "Overdue" is a valid filter.
  pub status_filter: Option<String>,
  pub today: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct InvoiceListItemDto {
  pub id: i64,
  pub client_id: i64,
  pub invoice_number: String,
  pub date_issued: NaiveDate,
  pub due_date: NaiveDate,
  pub status: String,
  pub display_status: String,
  pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
  pub invoices: Vec<InvoiceListItemDto>,
}

pub struct ListInvoicesUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ListInvoicesUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ListInvoicesCommand,
  ) -> Result<ListInvoicesResponse, InvoiceError> {
    let status_filter = match command.status_filter.as_deref().map(str::trim) {
      Some(status) if !status.is_empty() => Some(DisplayStatus::from_str(status)?),
      _ => None,
    };

    let invoices = self
      .invoice_service
      .list_invoices(command.client_filter, status_filter, command.today)
      .await?;

    let invoices = invoices
      .into_iter()
      .map(|invoice| InvoiceListItemDto {
        display_status: invoice.display_status(command.today).as_str().to_string(),
        id: invoice.id,
        client_id: invoice.client_id,
        invoice_number: invoice.invoice_number.into_inner(),
        date_issued: invoice.date_issued,
        due_date: invoice.due_date,
        status: invoice.status.as_str().to_string(),
        total_amount: invoice.total_amount,
      })
      .collect();

    Ok(ListInvoicesResponse { invoices })
  }
}
