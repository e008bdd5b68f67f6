use serde::Serialize;

use crate::domain::invoice::entities::{Client, Invoice, Settings};

/// The complete live dataset: the settings singleton plus every client and
/// every invoice (each carrying its ordered line items).
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
  pub settings: Settings,
  pub clients: Vec<Client>,
  pub invoices: Vec<Invoice>,
}

impl Dataset {
  pub fn line_item_count(&self) -> usize {
    self.invoices.iter().map(|invoice| invoice.items.len()).sum()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
  pub replaced_clients: usize,
  pub replaced_invoices: usize,
}
