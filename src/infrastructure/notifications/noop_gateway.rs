use crate::domain::invoice::errors::InvoiceError;
use crate::domain::invoice::ports::{Notification, NotificationGateway};
use async_trait::async_trait;

/// Accepts every notification without sending anything.
pub struct NoOpNotificationGateway;

#[async_trait]
impl NotificationGateway for NoOpNotificationGateway {
  async fn deliver(&self, notification: &Notification) -> Result<(), InvoiceError> {
    tracing::debug!(
      webhook_url = %notification.webhook_url,
      "NoOpNotificationGateway: skipping delivery"
    );
    Ok(())
  }
}
