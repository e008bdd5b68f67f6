use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::entities::ImportSummary;
use super::errors::BackupError;
use super::ports::DatasetRepository;
use super::snapshot::SnapshotDocument;

pub struct BackupService {
  dataset_repo: Arc<dyn DatasetRepository>,
}

impl BackupService {
  pub fn new(dataset_repo: Arc<dyn DatasetRepository>) -> Self {
    Self { dataset_repo }
  }

  pub async fn export_snapshot(
    &self,
    exported_at: DateTime<Utc>,
  ) -> Result<SnapshotDocument, BackupError> {
    let dataset = self.dataset_repo.export_dataset().await?;
    tracing::info!(
      clients = dataset.clients.len(),
      invoices = dataset.invoices.len(),
      line_items = dataset.line_item_count(),
      "Dataset exported"
    );
    Ok(SnapshotDocument::from_dataset(dataset, exported_at))
  }

  /// Irreversibly replaces the live dataset with the document's contents.
  /// The document is validated in full first; on any failure nothing changes.
  pub async fn import_snapshot(
    &self,
    document: &SnapshotDocument,
  ) -> Result<ImportSummary, BackupError> {
    let dataset = match document.validate() {
      Ok(dataset) => dataset,
      Err(e) => {
        if let BackupError::Integrity(violations) = &e {
          tracing::warn!(violations = violations.len(), "Snapshot rejected");
        }
        return Err(e);
      }
    };

    let summary = self.dataset_repo.replace_entire_dataset(dataset).await?;
    tracing::info!(
      replaced_clients = summary.replaced_clients,
      replaced_invoices = summary.replaced_invoices,
      "Dataset replaced from snapshot"
    );
    Ok(summary)
  }

  pub async fn import_json(&self, bytes: &[u8]) -> Result<ImportSummary, BackupError> {
    let document = SnapshotDocument::from_json(bytes)?;
    self.import_snapshot(&document).await
  }
}
