use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::invoice::{
  InvoiceError, InvoiceService, LineInput, Quantity, Rate, VatPercentage,
};

#[derive(Debug, Deserialize)]
pub struct TotalsLineInput {
  pub quantity: Decimal,
  pub rate: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ComputeInvoiceTotalsCommand {
  pub items: Vec<TotalsLineInput>,
  /// Decimal string such as "11"; the settings value is used when absent.
  pub vat_percentage: Option<String>,
  #[serde(default)]
  pub vat_exempt: bool,
}

#[derive(Debug, Serialize)]
pub struct ComputeInvoiceTotalsResponse {
  pub item_amounts: Vec<Decimal>,
  pub subtotal: Decimal,
  pub vat_percentage: Decimal,
  pub vat_amount: Decimal,
  pub total: Decimal,
}

pub struct ComputeInvoiceTotalsUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ComputeInvoiceTotalsUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ComputeInvoiceTotalsCommand,
  ) -> Result<ComputeInvoiceTotalsResponse, InvoiceError> {
    let items = command
      .items
      .into_iter()
      .map(|item| {
        Ok(LineInput {
          quantity: Quantity::new(item.quantity)?,
          rate: Rate::new(item.rate)?,
        })
      })
      .collect::<Result<Vec<_>, InvoiceError>>()?;

    let vat = match command.vat_percentage {
      Some(value) => VatPercentage::parse(&value)?,
      None => self.invoice_service.current_vat_percentage().await?,
    };

    let totals = InvoiceService::compute_totals(&items, vat, command.vat_exempt)?;

    Ok(ComputeInvoiceTotalsResponse {
      item_amounts: totals.item_amounts,
      subtotal: totals.subtotal,
      vat_percentage: vat.value(),
      vat_amount: totals.vat_amount,
      total: totals.total,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::{InvoiceServiceConfig, InvoiceServiceDependencies};
  use crate::infrastructure::notifications::NoOpNotificationGateway;
  use crate::infrastructure::persistence::InMemoryDatabase;
  use rust_decimal_macros::dec;

  fn use_case() -> ComputeInvoiceTotalsUseCase {
    let db = Arc::new(InMemoryDatabase::new());
    ComputeInvoiceTotalsUseCase::new(Arc::new(InvoiceService::new(
      InvoiceServiceDependencies {
        client_repo: db.clone(),
        invoice_repo: db.clone(),
        settings_repo: db,
        notifier: Arc::new(NoOpNotificationGateway),
      },
      InvoiceServiceConfig::default(),
    )))
  }

  fn reference_items() -> Vec<TotalsLineInput> {
    vec![
      TotalsLineInput {
        quantity: dec!(2),
        rate: dec!(50.00),
      },
      TotalsLineInput {
        quantity: dec!(1),
        rate: dec!(25.00),
      },
    ]
  }

  #[tokio::test]
  async fn test_uses_settings_vat_when_absent() {
    let response = use_case()
      .execute(ComputeInvoiceTotalsCommand {
        items: reference_items(),
        vat_percentage: None,
        vat_exempt: false,
      })
      .await
      .unwrap();

    assert_eq!(response.vat_percentage, dec!(11));
    assert_eq!(response.subtotal, dec!(125.00));
    assert_eq!(response.vat_amount, dec!(13.75));
    assert_eq!(response.total, dec!(138.75));
  }

  #[tokio::test]
  async fn test_rejects_negative_quantity_and_bad_vat() {
    let err = use_case()
      .execute(ComputeInvoiceTotalsCommand {
        items: vec![TotalsLineInput {
          quantity: dec!(-1),
          rate: dec!(10),
        }],
        vat_percentage: None,
        vat_exempt: false,
      })
      .await
      .unwrap_err();
    assert!(matches!(err, InvoiceError::Validation(_)));

    let err = use_case()
      .execute(ComputeInvoiceTotalsCommand {
        items: reference_items(),
        vat_percentage: Some("150".to_string()),
        vat_exempt: false,
      })
      .await
      .unwrap_err();
    assert!(matches!(err, InvoiceError::Validation(_)));
  }

  #[tokio::test]
  async fn test_amounts_beyond_decimal_range_are_rejected() {
    let huge = Decimal::from(10_000_000_000_000_000u64);
    let err = use_case()
      .execute(ComputeInvoiceTotalsCommand {
        items: vec![TotalsLineInput {
          quantity: huge,
          rate: huge,
        }],
        vat_percentage: Some("11".to_string()),
        vat_exempt: false,
      })
      .await
      .unwrap_err();
    assert!(matches!(err, InvoiceError::Validation(_)));
  }
}
