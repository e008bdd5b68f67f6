use actix_web::{HttpRequest, error::JsonPayloadError, web};
use std::sync::Arc;

use crate::application::backup::{ExportSnapshotUseCase, ImportSnapshotUseCase};
use crate::application::invoice::{
  ChangeInvoiceStatusUseCase, ComputeInvoiceTotalsUseCase, CreateClientUseCase,
  CreateInvoiceUseCase, DeleteClientUseCase, DeleteInvoiceUseCase, GetClientUseCase,
  GetInvoiceDetailsUseCase, ListClientsUseCase, ListInvoicesUseCase, MarkInvoicePaidUseCase,
  NextInvoiceNumberUseCase, UpdateClientUseCase, UpdateInvoiceUseCase,
};
use crate::application::settings::{GetSettingsUseCase, TestWebhookUseCase, UpdateSettingsUseCase};
use crate::domain::backup::BackupService;
use crate::domain::invoice::InvoiceService;

use super::errors::ApiError;
use super::handlers::{backup, clients, health, invoices, settings};

/// Largest accepted snapshot upload.
const IMPORT_PAYLOAD_LIMIT: usize = 32 * 1024 * 1024;

/// Every use case the JSON API dispatches to.
#[derive(Clone)]
pub struct ApiDependencies {
  pub compute_totals: Arc<ComputeInvoiceTotalsUseCase>,
  pub next_number: Arc<NextInvoiceNumberUseCase>,
  pub list_invoices: Arc<ListInvoicesUseCase>,
  pub create_invoice: Arc<CreateInvoiceUseCase>,
  pub get_invoice: Arc<GetInvoiceDetailsUseCase>,
  pub update_invoice: Arc<UpdateInvoiceUseCase>,
  pub delete_invoice: Arc<DeleteInvoiceUseCase>,
  pub change_status: Arc<ChangeInvoiceStatusUseCase>,
  pub mark_paid: Arc<MarkInvoicePaidUseCase>,
  pub list_clients: Arc<ListClientsUseCase>,
  pub create_client: Arc<CreateClientUseCase>,
  pub get_client: Arc<GetClientUseCase>,
  pub update_client: Arc<UpdateClientUseCase>,
  pub delete_client: Arc<DeleteClientUseCase>,
  pub get_settings: Arc<GetSettingsUseCase>,
  pub update_settings: Arc<UpdateSettingsUseCase>,
  pub test_webhook: Arc<TestWebhookUseCase>,
  pub export_snapshot: Arc<ExportSnapshotUseCase>,
  pub import_snapshot: Arc<ImportSnapshotUseCase>,
}

impl ApiDependencies {
  pub fn new(invoice_service: Arc<InvoiceService>, backup_service: Arc<BackupService>) -> Self {
    Self {
      compute_totals: Arc::new(ComputeInvoiceTotalsUseCase::new(invoice_service.clone())),
      next_number: Arc::new(NextInvoiceNumberUseCase::new(invoice_service.clone())),
      list_invoices: Arc::new(ListInvoicesUseCase::new(invoice_service.clone())),
      create_invoice: Arc::new(CreateInvoiceUseCase::new(invoice_service.clone())),
      get_invoice: Arc::new(GetInvoiceDetailsUseCase::new(invoice_service.clone())),
      update_invoice: Arc::new(UpdateInvoiceUseCase::new(invoice_service.clone())),
      delete_invoice: Arc::new(DeleteInvoiceUseCase::new(invoice_service.clone())),
      change_status: Arc::new(ChangeInvoiceStatusUseCase::new(invoice_service.clone())),
      mark_paid: Arc::new(MarkInvoicePaidUseCase::new(invoice_service.clone())),
      list_clients: Arc::new(ListClientsUseCase::new(invoice_service.clone())),
      create_client: Arc::new(CreateClientUseCase::new(invoice_service.clone())),
      get_client: Arc::new(GetClientUseCase::new(invoice_service.clone())),
      update_client: Arc::new(UpdateClientUseCase::new(invoice_service.clone())),
      delete_client: Arc::new(DeleteClientUseCase::new(invoice_service.clone())),
      get_settings: Arc::new(GetSettingsUseCase::new(invoice_service.clone())),
      update_settings: Arc::new(UpdateSettingsUseCase::new(invoice_service.clone())),
      test_webhook: Arc::new(TestWebhookUseCase::new(invoice_service)),
      export_snapshot: Arc::new(ExportSnapshotUseCase::new(backup_service.clone())),
      import_snapshot: Arc::new(ImportSnapshotUseCase::new(backup_service)),
    }
  }
}

/// Malformed JSON bodies get the same error shape as every other 400.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  ApiError::Validation(err.to_string()).into()
}

/// Configure the JSON API
///
/// Mounts every endpoint under the provided scope (e.g. /api/v1).
///
/// # Routes
///
/// - POST /invoices/totals - Preview totals
/// - GET /invoices/next-number?client_id= - Suggest the next invoice number
/// - GET /invoices?client_id=&status= - List invoices
/// - POST /invoices - Create invoice
/// - GET|PUT|DELETE /invoices/:invoice_id
/// - POST /invoices/:invoice_id/status - Set stored status
/// - POST /invoices/:invoice_id/pay - Mark paid and notify
/// - GET|POST /clients, GET|PUT|DELETE /clients/:client_id
/// - GET|PUT /settings, POST /settings/test-webhook
/// - GET /backup/export, POST /backup/import
/// - GET /health
pub fn configure_api_routes(cfg: &mut web::ServiceConfig, deps: ApiDependencies) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::Data::new(deps.compute_totals))
    .app_data(web::Data::new(deps.next_number))
    .app_data(web::Data::new(deps.list_invoices))
    .app_data(web::Data::new(deps.create_invoice))
    .app_data(web::Data::new(deps.get_invoice))
    .app_data(web::Data::new(deps.update_invoice))
    .app_data(web::Data::new(deps.delete_invoice))
    .app_data(web::Data::new(deps.change_status))
    .app_data(web::Data::new(deps.mark_paid))
    .app_data(web::Data::new(deps.list_clients))
    .app_data(web::Data::new(deps.create_client))
    .app_data(web::Data::new(deps.get_client))
    .app_data(web::Data::new(deps.update_client))
    .app_data(web::Data::new(deps.delete_client))
    .app_data(web::Data::new(deps.get_settings))
    .app_data(web::Data::new(deps.update_settings))
    .app_data(web::Data::new(deps.test_webhook))
    .app_data(web::Data::new(deps.export_snapshot))
    .app_data(web::Data::new(deps.import_snapshot))
    .route("/health", web::get().to(health::health_handler))
    // Literal segments before /invoices/{invoice_id}
    .route(
      "/invoices/totals",
      web::post().to(invoices::compute_totals_handler),
    )
    .route(
      "/invoices/next-number",
      web::get().to(invoices::next_number_handler),
    )
    .route("/invoices", web::get().to(invoices::list_invoices_handler))
    .route("/invoices", web::post().to(invoices::create_invoice_handler))
    .route(
      "/invoices/{invoice_id}",
      web::get().to(invoices::get_invoice_handler),
    )
    .route(
      "/invoices/{invoice_id}",
      web::put().to(invoices::update_invoice_handler),
    )
    .route(
      "/invoices/{invoice_id}",
      web::delete().to(invoices::delete_invoice_handler),
    )
    .route(
      "/invoices/{invoice_id}/status",
      web::post().to(invoices::change_status_handler),
    )
    .route(
      "/invoices/{invoice_id}/pay",
      web::post().to(invoices::mark_paid_handler),
    )
    .route("/clients", web::get().to(clients::list_clients_handler))
    .route("/clients", web::post().to(clients::create_client_handler))
    .route(
      "/clients/{client_id}",
      web::get().to(clients::get_client_handler),
    )
    .route(
      "/clients/{client_id}",
      web::put().to(clients::update_client_handler),
    )
    .route(
      "/clients/{client_id}",
      web::delete().to(clients::delete_client_handler),
    )
    .route("/settings", web::get().to(settings::get_settings_handler))
    .route("/settings", web::put().to(settings::update_settings_handler))
    .route(
      "/settings/test-webhook",
      web::post().to(settings::test_webhook_handler),
    )
    .route("/backup/export", web::get().to(backup::export_handler))
    .service(
      web::resource("/backup/import")
        .app_data(web::PayloadConfig::new(IMPORT_PAYLOAD_LIMIT))
        .route(web::post().to(backup::import_handler)),
    );
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::http::middleware::RequestIdMiddleware;
  use crate::domain::backup::BackupService;
  use crate::domain::invoice::{InvoiceServiceConfig, InvoiceServiceDependencies};
  use crate::infrastructure::notifications::NoOpNotificationGateway;
  use crate::infrastructure::persistence::InMemoryDatabase;
  use actix_web::{App, http::StatusCode, test};
  use serde_json::{Value, json};

  fn dependencies() -> ApiDependencies {
    let db = Arc::new(InMemoryDatabase::new());
    let invoice_service = Arc::new(InvoiceService::new(
      InvoiceServiceDependencies {
        client_repo: db.clone(),
        invoice_repo: db.clone(),
        settings_repo: db.clone(),
        notifier: Arc::new(NoOpNotificationGateway),
      },
      InvoiceServiceConfig::default(),
    ));
    let backup_service = Arc::new(BackupService::new(db));
    ApiDependencies::new(invoice_service, backup_service)
  }

  macro_rules! api {
    () => {
      test::init_service(
        App::new()
          .wrap(RequestIdMiddleware::new())
          .service(
            web::scope("/api/v1").configure(|cfg| configure_api_routes(cfg, dependencies())),
          ),
      )
      .await
    };
  }

  #[actix_web::test]
  async fn test_health() {
    let app = api!();
    let resp = test::call_service(
      &app,
      test::TestRequest::get().uri("/api/v1/health").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
  }

  #[actix_web::test]
  async fn test_invoice_lifecycle() {
    let app = api!();

    let client: Value = test::call_and_read_body_json(
      &app,
      test::TestRequest::post()
        .uri("/api/v1/clients")
        .set_json(json!({ "name": "Acme Corp" }))
        .to_request(),
    )
    .await;
    let client_id = client["id"].as_i64().unwrap();

    let next: Value = test::call_and_read_body_json(
      &app,
      test::TestRequest::get()
        .uri(&format!("/api/v1/invoices/next-number?client_id={client_id}"))
        .to_request(),
    )
    .await;
    assert_eq!(next["invoice_number"], "ACM-1");

    let resp = test::call_service(
      &app,
      test::TestRequest::post()
        .uri("/api/v1/invoices")
        .set_json(json!({
          "client_id": client_id,
          "date_issued": "2026-01-01",
          "line_items": [
            { "description": "Consulting", "quantity": "2", "rate": "50.00" },
            { "description": "Support", "quantity": "1", "rate": "25.00" }
          ]
        }))
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let invoice: Value = test::read_body_json(resp).await;
    assert_eq!(invoice["invoice_number"], "ACM-1");
    assert_eq!(invoice["total_amount"], "138.75");
    assert_eq!(invoice["due_date"], "2026-01-15");
    let invoice_id = invoice["id"].as_i64().unwrap();

    // Sent and long past due
    let status: Value = test::call_and_read_body_json(
      &app,
      test::TestRequest::post()
        .uri(&format!("/api/v1/invoices/{invoice_id}/status"))
        .set_json(json!({ "status": "Sent" }))
        .to_request(),
    )
    .await;
    assert_eq!(status["status"], "Sent");

    let overdue: Value = test::call_and_read_body_json(
      &app,
      test::TestRequest::get()
        .uri("/api/v1/invoices?status=Overdue")
        .to_request(),
    )
    .await;
    assert_eq!(overdue["invoices"].as_array().unwrap().len(), 1);

    let paid: Value = test::call_and_read_body_json(
      &app,
      test::TestRequest::post()
        .uri(&format!("/api/v1/invoices/{invoice_id}/pay"))
        .to_request(),
    )
    .await;
    assert_eq!(paid["status"], "Paid");
    assert_eq!(paid["notification"]["outcome"], "skipped");

    let resp = test::call_service(
      &app,
      test::TestRequest::delete()
        .uri(&format!("/api/v1/clients/{client_id}"))
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  #[actix_web::test]
  async fn test_error_statuses() {
    let app = api!();

    let resp = test::call_service(
      &app,
      test::TestRequest::get().uri("/api/v1/invoices/999").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");

    let resp = test::call_service(
      &app,
      test::TestRequest::post()
        .uri("/api/v1/invoices/totals")
        .set_json(json!({ "items": [{ "quantity": "-1", "rate": "10" }] }))
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
      &app,
      test::TestRequest::post()
        .uri("/api/v1/invoices/totals")
        .set_json(json!({
          "items": [{ "quantity": "10000000000000000", "rate": "10000000000000000" }]
        }))
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
      &app,
      test::TestRequest::post()
        .uri("/api/v1/clients")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
  }

  #[actix_web::test]
  async fn test_totals_preview() {
    let app = api!();

    let totals: Value = test::call_and_read_body_json(
      &app,
      test::TestRequest::post()
        .uri("/api/v1/invoices/totals")
        .set_json(json!({
          "items": [
            { "quantity": "2", "rate": "50.00" },
            { "quantity": "1", "rate": "25.00" }
          ],
          "vat_percentage": "11"
        }))
        .to_request(),
    )
    .await;

    assert_eq!(totals["subtotal"], "125.00");
    assert_eq!(totals["vat_amount"], "13.75");
    assert_eq!(totals["total"], "138.75");
  }

  #[actix_web::test]
  async fn test_backup_export_and_rejected_import() {
    let app = api!();

    test::call_service(
      &app,
      test::TestRequest::post()
        .uri("/api/v1/clients")
        .set_json(json!({ "name": "Acme" }))
        .to_request(),
    )
    .await;

    let resp = test::call_service(
      &app,
      test::TestRequest::get().uri("/api/v1/backup/export").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
      .headers()
      .get("content-disposition")
      .unwrap()
      .to_str()
      .unwrap()
      .to_string();
    assert!(disposition.contains("invoice_data_"));
    let mut snapshot: Value = test::read_body_json(resp).await;
    assert_eq!(snapshot["clients"].as_array().unwrap().len(), 1);

    // Dangling client reference
    snapshot["invoices"] = json!([{
      "id": 1,
      "client_id": 42,
      "invoice_number": "X-1",
      "date_issued": "2026-01-01",
      "due_date": "2026-01-15",
      "status": "Draft",
      "vat_exempt": false,
      "vat_exempt_reason": null,
      "total_amount": "0",
      "line_items": []
    }]);

    let resp = test::call_service(
      &app,
      test::TestRequest::post()
        .uri("/api/v1/backup/import")
        .set_payload(serde_json::to_vec(&snapshot).unwrap())
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"][0]["field"], "client_id");

    let clients: Value = test::call_and_read_body_json(
      &app,
      test::TestRequest::get().uri("/api/v1/clients").to_request(),
    )
    .await;
    assert_eq!(clients["clients"].as_array().unwrap().len(), 1);
  }
}
