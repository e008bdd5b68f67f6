use std::sync::Arc;

use crate::domain::invoice::{InvoiceError, InvoiceService, Settings};

pub struct GetSettingsUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetSettingsUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self) -> Result<Settings, InvoiceError> {
    self.invoice_service.get_settings().await
  }
}
