use serde::Deserialize;
use std::sync::Arc;

use crate::domain::invoice::{InvoiceError, InvoiceService};

#[derive(Debug, Deserialize)]
pub struct DeleteClientCommand {
  pub client_id: i64,
}

pub struct DeleteClientUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl DeleteClientUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  /// Irreversible. Fails with `ClientHasInvoices` while invoices remain.
  pub async fn execute(&self, command: DeleteClientCommand) -> Result<(), InvoiceError> {
    self.invoice_service.delete_client(command.client_id).await
  }
}
