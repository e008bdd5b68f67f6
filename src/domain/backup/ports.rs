use async_trait::async_trait;

use super::entities::{Dataset, ImportSummary};
use super::errors::BackupError;

#[async_trait]
pub trait DatasetRepository: Send + Sync {
  /// Reads the whole dataset as one consistent point-in-time view.
  async fn export_dataset(&self) -> Result<Dataset, BackupError>;

  /// Irreversibly replaces the whole dataset, preserving the given ids.
  /// All-or-nothing: on error the previous dataset is left untouched, and no
  /// reader ever observes a partially replaced dataset.
  async fn replace_entire_dataset(&self, dataset: Dataset) -> Result<ImportSummary, BackupError>;
}
