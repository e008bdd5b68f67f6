use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::invoice::{InvoiceError, InvoiceService};

#[derive(Debug, Deserialize)]
pub struct TestWebhookCommand {
  /// Uses the saved webhook URL when absent.
  pub webhook_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TestWebhookResponse {
  pub delivered: bool,
  pub message: String,
}

pub struct TestWebhookUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl TestWebhookUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: TestWebhookCommand,
  ) -> Result<TestWebhookResponse, InvoiceError> {
    let webhook_url = match command
      .webhook_url
      .map(|url| url.trim().to_string())
      .filter(|url| !url.is_empty())
    {
      Some(url) => url,
      None => match self.invoice_service.get_settings().await?.webhook_url() {
        Some(url) => url.to_string(),
        None => {
          return Ok(TestWebhookResponse {
            delivered: false,
            message: "No webhook URL configured".to_string(),
          });
        }
      },
    };

    // Delivery failures are reported in the response, not as errors.
    Ok(match self.invoice_service.test_webhook(webhook_url).await {
      Ok(()) => TestWebhookResponse {
        delivered: true,
        message: "Test notification sent".to_string(),
      },
      Err(e) => TestWebhookResponse {
        delivered: false,
        message: e.to_string(),
      },
    })
  }
}
