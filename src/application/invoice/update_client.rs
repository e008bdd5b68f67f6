use serde::Deserialize;
use std::sync::Arc;

use super::create_client::CreateClientCommand;
use super::list_clients::ClientDto;
use crate::domain::invoice::{InvoiceError, InvoiceService};

#[derive(Debug, Deserialize)]
pub struct UpdateClientCommand {
  pub client_id: i64,
  #[serde(flatten)]
  pub details: CreateClientCommand,
}

pub struct UpdateClientUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl UpdateClientUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self, command: UpdateClientCommand) -> Result<ClientDto, InvoiceError> {
    let details = command.details.into_details()?;
    let client = self
      .invoice_service
      .update_client(command.client_id, details)
      .await?;
    Ok(client.into())
  }
}
