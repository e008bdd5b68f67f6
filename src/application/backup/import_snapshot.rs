use std::sync::Arc;

use crate::domain::backup::{BackupError, BackupService, ImportSummary};

#[derive(Debug)]
pub struct ImportSnapshotCommand {
  /// Raw snapshot document as produced by an export.
  pub payload: Vec<u8>,
}

pub struct ImportSnapshotUseCase {
  backup_service: Arc<BackupService>,
}

impl ImportSnapshotUseCase {
  pub fn new(backup_service: Arc<BackupService>) -> Self {
    Self { backup_service }
  }

  /// Irreversibly replaces the whole dataset; callers confirm before invoking.
  pub async fn execute(&self, command: ImportSnapshotCommand) -> Result<ImportSummary, BackupError> {
    self.backup_service.import_json(&command.payload).await
  }
}
