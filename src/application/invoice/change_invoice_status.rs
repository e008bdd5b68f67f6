use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::invoice::{InvoiceError, InvoiceService, InvoiceStatus};

#[derive(Debug, Deserialize)]
pub struct ChangeInvoiceStatusCommand {
  pub invoice_id: i64,
  pub new_status: String,
  pub today: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct ChangeInvoiceStatusResponse {
  pub invoice_id: i64,
  pub status: String,
  pub display_status: String,
}

pub struct ChangeInvoiceStatusUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ChangeInvoiceStatusUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ChangeInvoiceStatusCommand,
  ) -> Result<ChangeInvoiceStatusResponse, InvoiceError> {
    // Only Draft, Sent and Paid are assignable; Overdue is derived.
    let new_status = InvoiceStatus::from_str(&command.new_status)
      .map_err(|e| InvoiceError::InvalidStatus(e.to_string()))?;

    let invoice = self
      .invoice_service
      .set_status(command.invoice_id, new_status)
      .await?;

    Ok(ChangeInvoiceStatusResponse {
      invoice_id: invoice.id,
      status: invoice.status.as_str().to_string(),
      display_status: invoice.display_status(command.today).as_str().to_string(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::{
    ClientDetails, ClientName, InvoiceData, InvoiceServiceConfig, InvoiceServiceDependencies,
  };
  use crate::infrastructure::notifications::NoOpNotificationGateway;
  use crate::infrastructure::persistence::InMemoryDatabase;

  async fn setup() -> (ChangeInvoiceStatusUseCase, i64) {
    let db = Arc::new(InMemoryDatabase::new());
    let service = Arc::new(InvoiceService::new(
      InvoiceServiceDependencies {
        client_repo: db.clone(),
        invoice_repo: db.clone(),
        settings_repo: db,
        notifier: Arc::new(NoOpNotificationGateway),
      },
      InvoiceServiceConfig::default(),
    ));
    let client = service
      .create_client(ClientDetails {
        name: ClientName::new("Acme".to_string()).unwrap(),
        address: None,
        email: None,
        phone: None,
        category: None,
      })
      .await
      .unwrap();
    let invoice = service
      .create_invoice(InvoiceData {
        client_id: client.id,
        invoice_number: None,
        date_issued: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        due_date: None,
        vat_exempt: false,
        vat_exempt_reason: None,
        line_items: vec![],
      })
      .await
      .unwrap();
    (ChangeInvoiceStatusUseCase::new(service), invoice.id)
  }

  #[tokio::test]
  async fn test_sent_past_due_displays_overdue() {
    let (use_case, invoice_id) = setup().await;
    let response = use_case
      .execute(ChangeInvoiceStatusCommand {
        invoice_id,
        new_status: "sent".to_string(),
        today: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
      })
      .await
      .unwrap();

    assert_eq!(response.status, "Sent");
    assert_eq!(response.display_status, "Overdue");
  }

  #[tokio::test]
  async fn test_overdue_and_unknown_statuses_rejected() {
    let (use_case, invoice_id) = setup().await;
    for status in ["Overdue", "Cancelled"] {
      let err = use_case
        .execute(ChangeInvoiceStatusCommand {
          invoice_id,
          new_status: status.to_string(),
          today: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
        })
        .await
        .unwrap_err();
      assert!(matches!(err, InvoiceError::InvalidStatus(_)));
    }
  }
}
