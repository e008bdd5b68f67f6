use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::invoice::{InvoiceError, InvoiceService, NotificationOutcome};

#[derive(Debug, Deserialize)]
pub struct MarkInvoicePaidCommand {
  pub invoice_id: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkInvoicePaidResponse {
  pub invoice_id: i64,
  pub invoice_number: String,
  pub status: String,
  /// Informational only; a failed notification never fails the request.
  pub notification: NotificationOutcome,
}

pub struct MarkInvoicePaidUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl MarkInvoicePaidUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: MarkInvoicePaidCommand,
  ) -> Result<MarkInvoicePaidResponse, InvoiceError> {
    let change = self.invoice_service.mark_paid(command.invoice_id).await?;

    Ok(MarkInvoicePaidResponse {
      invoice_id: change.invoice.id,
      invoice_number: change.invoice.invoice_number.into_inner(),
      status: change.invoice.status.as_str().to_string(),
      notification: change.notification,
    })
  }
}
