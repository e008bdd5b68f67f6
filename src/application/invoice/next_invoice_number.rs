use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::invoice::{InvoiceError, InvoiceService};

#[derive(Debug, Deserialize)]
pub struct NextInvoiceNumberCommand {
  pub client_id: i64,
}

#[derive(Debug, Serialize)]
pub struct NextInvoiceNumberResponse {
  pub client_id: i64,
  pub invoice_number: String,
}

/// Proposes a number without reserving it; creating an invoice without a
/// number is the race-free way to obtain one.
pub struct NextInvoiceNumberUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl NextInvoiceNumberUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: NextInvoiceNumberCommand,
  ) -> Result<NextInvoiceNumberResponse, InvoiceError> {
    let invoice_number = self
      .invoice_service
      .next_invoice_number(command.client_id)
      .await?;

    Ok(NextInvoiceNumberResponse {
      client_id: command.client_id,
      invoice_number,
    })
  }
}
