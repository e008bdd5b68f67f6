use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::domain::invoice::errors::InvoiceError;
use crate::domain::invoice::ports::{Notification, NotificationGateway};

/// Chat-style webhook payload (Discord/Slack compatible `content` field).
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
  content: &'a str,
}

/// Posts notifications as JSON to the configured webhook URL.
pub struct WebhookNotificationGateway {
  client: Client,
}

impl WebhookNotificationGateway {
  pub fn new(timeout: Duration) -> Result<Self, InvoiceError> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| InvoiceError::Notification(format!("Failed to create HTTP client: {}", e)))?;
    Ok(Self { client })
  }
}

#[async_trait]
impl NotificationGateway for WebhookNotificationGateway {
  async fn deliver(&self, notification: &Notification) -> Result<(), InvoiceError> {
    let response = self
      .client
      .post(&notification.webhook_url)
      .json(&WebhookPayload {
        content: &notification.content,
      })
      .send()
      .await
      .map_err(|e| InvoiceError::Notification(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
      tracing::debug!(status = status.as_u16(), "Webhook delivered");
      Ok(())
    } else {
      Err(InvoiceError::Notification(format!(
        "webhook responded with HTTP {}",
        status.as_u16()
      )))
    }
  }
}
