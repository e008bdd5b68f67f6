use actix_web::{
  HttpResponse,
  http::header::{ContentDisposition, DispositionParam, DispositionType},
  web,
};
use chrono::Utc;
use std::sync::Arc;

use crate::{
  adapters::http::errors::ApiError,
  application::backup::{
    ExportSnapshotCommand, ExportSnapshotUseCase, ImportSnapshotCommand, ImportSnapshotUseCase,
  },
};

/// Download the whole dataset as a JSON attachment
/// GET /api/v1/backup/export
pub async fn export_handler(
  use_case: web::Data<Arc<ExportSnapshotUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = use_case
    .execute(ExportSnapshotCommand {
      exported_at: Utc::now(),
    })
    .await?;

  Ok(
    HttpResponse::Ok()
      .content_type("application/json")
      .insert_header(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(response.file_name)],
      })
      .body(response.json),
  )
}

/// Replace the whole dataset with the posted snapshot. Irreversible.
///
/// A rejected document leaves the existing data untouched.
/// POST /api/v1/backup/import
pub async fn import_handler(
  body: web::Bytes,
  use_case: web::Data<Arc<ImportSnapshotUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let summary = use_case
    .execute(ImportSnapshotCommand {
      payload: body.to_vec(),
    })
    .await?;

  Ok(HttpResponse::Ok().json(summary))
}
