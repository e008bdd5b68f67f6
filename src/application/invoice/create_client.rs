use serde::Deserialize;
use std::sync::Arc;

use super::list_clients::ClientDto;
use crate::domain::invoice::{ClientDetails, ClientName, InvoiceError, InvoiceService};

/// Blank optional fields are stored as absent.
pub(super) fn optional_text(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct CreateClientCommand {
  pub name: String,
  pub address: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub category: Option<String>,
}

impl CreateClientCommand {
  pub(super) fn into_details(self) -> Result<ClientDetails, InvoiceError> {
    Ok(ClientDetails {
      name: ClientName::new(self.name)?,
      address: optional_text(self.address),
      email: optional_text(self.email),
      phone: optional_text(self.phone),
      category: optional_text(self.category),
    })
  }
}

pub struct CreateClientUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl CreateClientUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self, command: CreateClientCommand) -> Result<ClientDto, InvoiceError> {
    let client = self
      .invoice_service
      .create_client(command.into_details()?)
      .await?;
    Ok(client.into())
  }
}
