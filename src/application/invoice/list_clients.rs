use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::invoice::{Client, InvoiceError, InvoiceService};

#[derive(Debug, Default, Deserialize)]
pub struct ListClientsCommand {}

#[derive(Debug, Serialize)]
pub struct ClientDto {
  pub id: i64,
  pub name: String,
  pub address: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub category: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl From<Client> for ClientDto {
  fn from(client: Client) -> Self {
    Self {
      id: client.id,
      name: client.name.value().to_string(),
      address: client.address,
      email: client.email,
      phone: client.phone,
      category: client.category,
      created_at: client.created_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ListClientsResponse {
  pub clients: Vec<ClientDto>,
}

pub struct ListClientsUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ListClientsUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    _command: ListClientsCommand,
  ) -> Result<ListClientsResponse, InvoiceError> {
    let clients = self.invoice_service.list_clients().await?;

    Ok(ListClientsResponse {
      clients: clients.into_iter().map(ClientDto::from).collect(),
    })
  }
}
