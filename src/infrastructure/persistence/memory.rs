use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::backup::{BackupError, Dataset, DatasetRepository, ImportSummary};
use crate::domain::invoice::{
  Client, ClientDetails, ClientRepository, Invoice, InvoiceDraft, InvoiceError, InvoiceRepository,
  InvoiceRevision, InvoiceStatus, LineItem, NewLineItem, Settings, SettingsRepository,
};

#[derive(Debug, Clone)]
struct Store {
  settings: Settings,
  clients: BTreeMap<i64, Client>,
  invoices: BTreeMap<i64, Invoice>,
  next_client_id: i64,
  next_invoice_id: i64,
  next_line_item_id: i64,
}

impl Default for Store {
  fn default() -> Self {
    Self {
      settings: Settings::default(),
      clients: BTreeMap::new(),
      invoices: BTreeMap::new(),
      next_client_id: 1,
      next_invoice_id: 1,
      next_line_item_id: 1,
    }
  }
}

impl Store {
  /// Starts a new id generation after the highest id present in the dataset.
  fn from_dataset(dataset: Dataset) -> Self {
    let next_client_id = dataset.clients.iter().map(|c| c.id).max().unwrap_or(0) + 1;
    let next_invoice_id = dataset.invoices.iter().map(|i| i.id).max().unwrap_or(0) + 1;
    let next_line_item_id = dataset
      .invoices
      .iter()
      .flat_map(|i| i.items.iter().map(|item| item.id))
      .max()
      .unwrap_or(0)
      + 1;

    Self {
      settings: dataset.settings,
      clients: dataset.clients.into_iter().map(|c| (c.id, c)).collect(),
      invoices: dataset.invoices.into_iter().map(|i| (i.id, i)).collect(),
      next_client_id,
      next_invoice_id,
      next_line_item_id,
    }
  }

  fn ensure_number_free(
    &self,
    client_id: i64,
    invoice_number: &str,
    exclude_id: Option<i64>,
  ) -> Result<(), InvoiceError> {
    let taken = self.invoices.values().any(|invoice| {
      invoice.client_id == client_id
        && invoice.invoice_number.value() == invoice_number
        && Some(invoice.id) != exclude_id
    });
    if taken {
      return Err(InvoiceError::InvoiceNumberAlreadyExists {
        client_id,
        invoice_number: invoice_number.to_string(),
      });
    }
    Ok(())
  }

  fn allocate_items(&mut self, invoice_id: i64, items: Vec<NewLineItem>) -> Vec<LineItem> {
    items
      .into_iter()
      .map(|item| {
        let id = self.next_line_item_id;
        self.next_line_item_id += 1;
        LineItem {
          id,
          invoice_id,
          description: item.description,
          quantity: item.quantity,
          rate: item.rate,
          amount: item.amount,
        }
      })
      .collect()
  }

  fn invoice_count(&self, client_id: i64) -> usize {
    self
      .invoices
      .values()
      .filter(|invoice| invoice.client_id == client_id)
      .count()
  }
}

/// Process-local dataset behind a single async read/write lock. Every
/// operation runs under one lock acquisition, so readers never observe a
/// half-applied write or a half-replaced dataset.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
  store: RwLock<Store>,
}

impl InMemoryDatabase {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ClientRepository for InMemoryDatabase {
  async fn create(&self, details: ClientDetails) -> Result<Client, InvoiceError> {
    let mut store = self.store.write().await;
    let id = store.next_client_id;
    store.next_client_id += 1;

    let client = Client {
      id,
      name: details.name,
      address: details.address,
      email: details.email,
      phone: details.phone,
      category: details.category,
      created_at: Utc::now(),
    };
    store.clients.insert(id, client.clone());
    Ok(client)
  }

  async fn update(&self, client: Client) -> Result<Client, InvoiceError> {
    let mut store = self.store.write().await;
    match store.clients.get_mut(&client.id) {
      Some(existing) => {
        *existing = client.clone();
        Ok(client)
      }
      None => Err(InvoiceError::ClientNotFound(client.id)),
    }
  }

  async fn find_by_id(&self, id: i64) -> Result<Option<Client>, InvoiceError> {
    Ok(self.store.read().await.clients.get(&id).cloned())
  }

  async fn list(&self) -> Result<Vec<Client>, InvoiceError> {
    let store = self.store.read().await;
    let mut clients: Vec<Client> = store.clients.values().cloned().collect();
    clients.sort_by(|a, b| a.name.value().cmp(b.name.value()).then(a.id.cmp(&b.id)));
    Ok(clients)
  }

  async fn delete(&self, id: i64) -> Result<bool, InvoiceError> {
    let mut store = self.store.write().await;
    let invoice_count = store.invoice_count(id);
    if invoice_count > 0 {
      return Err(InvoiceError::ClientHasInvoices {
        client_id: id,
        invoice_count,
      });
    }
    Ok(store.clients.remove(&id).is_some())
  }
}

#[async_trait]
impl InvoiceRepository for InMemoryDatabase {
  async fn create(&self, draft: InvoiceDraft) -> Result<Invoice, InvoiceError> {
    let mut store = self.store.write().await;
    if !store.clients.contains_key(&draft.client_id) {
      return Err(InvoiceError::ClientNotFound(draft.client_id));
    }
    store.ensure_number_free(draft.client_id, draft.invoice_number.value(), None)?;

    let id = store.next_invoice_id;
    store.next_invoice_id += 1;
    let items = store.allocate_items(id, draft.items);

    let invoice = Invoice {
      id,
      client_id: draft.client_id,
      invoice_number: draft.invoice_number,
      date_issued: draft.date_issued,
      due_date: draft.due_date,
      status: draft.status,
      vat_exempt: draft.vat_exempt,
      vat_exempt_reason: draft.vat_exempt_reason,
      items,
      total_amount: draft.total_amount,
    };
    store.invoices.insert(id, invoice.clone());
    Ok(invoice)
  }

  async fn update(
    &self,
    id: i64,
    revision: InvoiceRevision,
  ) -> Result<Option<Invoice>, InvoiceError> {
    let mut store = self.store.write().await;
    let Some(status) = store.invoices.get(&id).map(|invoice| invoice.status) else {
      return Ok(None);
    };
    if !store.clients.contains_key(&revision.client_id) {
      return Err(InvoiceError::ClientNotFound(revision.client_id));
    }
    store.ensure_number_free(revision.client_id, revision.invoice_number.value(), Some(id))?;

    let items = store.allocate_items(id, revision.items);
    let invoice = Invoice {
      id,
      client_id: revision.client_id,
      invoice_number: revision.invoice_number,
      date_issued: revision.date_issued,
      due_date: revision.due_date,
      status,
      vat_exempt: revision.vat_exempt,
      vat_exempt_reason: revision.vat_exempt_reason,
      items,
      total_amount: revision.total_amount,
    };
    store.invoices.insert(id, invoice.clone());
    Ok(Some(invoice))
  }

  async fn update_status(
    &self,
    id: i64,
    status: InvoiceStatus,
  ) -> Result<Option<Invoice>, InvoiceError> {
    let mut store = self.store.write().await;
    Ok(store.invoices.get_mut(&id).map(|invoice| {
      invoice.status = status;
      invoice.clone()
    }))
  }

  async fn find_by_id(&self, id: i64) -> Result<Option<Invoice>, InvoiceError> {
    Ok(self.store.read().await.invoices.get(&id).cloned())
  }

  async fn list(&self, client_id: Option<i64>) -> Result<Vec<Invoice>, InvoiceError> {
    let store = self.store.read().await;
    let mut invoices: Vec<Invoice> = store
      .invoices
      .values()
      .filter(|invoice| client_id.is_none_or(|id| invoice.client_id == id))
      .cloned()
      .collect();
    invoices.sort_by(|a, b| b.date_issued.cmp(&a.date_issued).then(b.id.cmp(&a.id)));
    Ok(invoices)
  }

  async fn list_invoice_numbers_for_client(
    &self,
    client_id: i64,
  ) -> Result<Vec<String>, InvoiceError> {
    let store = self.store.read().await;
    Ok(
      store
        .invoices
        .values()
        .filter(|invoice| invoice.client_id == client_id)
        .map(|invoice| invoice.invoice_number.value().to_string())
        .collect(),
    )
  }

  async fn count_for_client(&self, client_id: i64) -> Result<usize, InvoiceError> {
    Ok(self.store.read().await.invoice_count(client_id))
  }

  async fn delete(&self, id: i64) -> Result<bool, InvoiceError> {
    Ok(self.store.write().await.invoices.remove(&id).is_some())
  }
}

#[async_trait]
impl SettingsRepository for InMemoryDatabase {
  async fn get(&self) -> Result<Settings, InvoiceError> {
    Ok(self.store.read().await.settings.clone())
  }

  async fn update(&self, settings: Settings) -> Result<Settings, InvoiceError> {
    self.store.write().await.settings = settings.clone();
    Ok(settings)
  }
}

#[async_trait]
impl DatasetRepository for InMemoryDatabase {
  async fn export_dataset(&self) -> Result<Dataset, BackupError> {
    let store = self.store.read().await;
    Ok(Dataset {
      settings: store.settings.clone(),
      clients: store.clients.values().cloned().collect(),
      invoices: store.invoices.values().cloned().collect(),
    })
  }

  async fn replace_entire_dataset(&self, dataset: Dataset) -> Result<ImportSummary, BackupError> {
    let summary = ImportSummary {
      replaced_clients: dataset.clients.len(),
      replaced_invoices: dataset.invoices.len(),
    };
    // Built before taking the lock; the swap itself is a single assignment.
    let replacement = Store::from_dataset(dataset);
    *self.store.write().await = replacement;
    Ok(summary)
  }
}
