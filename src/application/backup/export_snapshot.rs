use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::backup::{BackupError, BackupService, SnapshotDocument};

#[derive(Debug)]
pub struct ExportSnapshotCommand {
  pub exported_at: DateTime<Utc>,
}

pub struct ExportSnapshotResponse {
  /// Suggested download name, e.g. `invoice_data_2026-10-19.json`.
  pub file_name: String,
  pub json: String,
  pub document: SnapshotDocument,
}

pub struct ExportSnapshotUseCase {
  backup_service: Arc<BackupService>,
}

impl ExportSnapshotUseCase {
  pub fn new(backup_service: Arc<BackupService>) -> Self {
    Self { backup_service }
  }

  pub async fn execute(
    &self,
    command: ExportSnapshotCommand,
  ) -> Result<ExportSnapshotResponse, BackupError> {
    let document = self
      .backup_service
      .export_snapshot(command.exported_at)
      .await?;
    let json = document.to_json_pretty()?;

    Ok(ExportSnapshotResponse {
      file_name: format!(
        "invoice_data_{}.json",
        command.exported_at.format("%Y-%m-%d")
      ),
      json,
      document,
    })
  }
}
