use serde::Deserialize;
use std::sync::Arc;

use super::list_clients::ClientDto;
use crate::domain::invoice::{InvoiceError, InvoiceService};

#[derive(Debug, Deserialize)]
pub struct GetClientCommand {
  pub client_id: i64,
}

pub struct GetClientUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetClientUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self, command: GetClientCommand) -> Result<ClientDto, InvoiceError> {
    let client = self.invoice_service.get_client(command.client_id).await?;
    Ok(client.into())
  }
}
