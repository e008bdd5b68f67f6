use actix_web::{HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use super::today;
use crate::{
  adapters::http::{
    dtos::{
      InvoiceListQuery, InvoiceRequest, LineItemRequest, NextNumberQuery, StatusChangeRequest,
      SuccessResponse, TotalsRequest,
    },
    errors::ApiError,
  },
  application::invoice::{
    ChangeInvoiceStatusCommand, ChangeInvoiceStatusUseCase, ComputeInvoiceTotalsCommand,
    ComputeInvoiceTotalsUseCase, CreateInvoiceCommand, CreateInvoiceUseCase, DeleteInvoiceCommand,
    DeleteInvoiceUseCase, GetInvoiceDetailsCommand, GetInvoiceDetailsUseCase,
    InvoiceLineItemInput, ListInvoicesCommand, ListInvoicesUseCase, MarkInvoicePaidCommand,
    MarkInvoicePaidUseCase, NextInvoiceNumberCommand, NextInvoiceNumberUseCase, TotalsLineInput,
    UpdateInvoiceCommand, UpdateInvoiceUseCase,
  },
};

impl From<LineItemRequest> for InvoiceLineItemInput {
  fn from(item: LineItemRequest) -> Self {
    Self {
      description: item.description,
      quantity: item.quantity,
      rate: item.rate,
    }
  }
}

/// Preview totals without saving anything
/// POST /api/v1/invoices/totals
pub async fn compute_totals_handler(
  request: web::Json<TotalsRequest>,
  use_case: web::Data<Arc<ComputeInvoiceTotalsUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let request = request.into_inner();

  let command = ComputeInvoiceTotalsCommand {
    items: request
      .items
      .into_iter()
      .map(|item| TotalsLineInput {
        quantity: item.quantity,
        rate: item.rate,
      })
      .collect(),
    vat_percentage: request.vat_percentage,
    vat_exempt: request.vat_exempt,
  };

  let response = use_case.execute(command).await?;

  Ok(HttpResponse::Ok().json(response))
}

/// Suggest the next invoice number for a client
/// GET /api/v1/invoices/next-number?client_id=
pub async fn next_number_handler(
  query: web::Query<NextNumberQuery>,
  use_case: web::Data<Arc<NextInvoiceNumberUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = use_case
    .execute(NextInvoiceNumberCommand {
      client_id: query.client_id,
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}

/// List invoices, optionally filtered by client and display status
/// GET /api/v1/invoices?client_id=&status=
pub async fn list_invoices_handler(
  query: web::Query<InvoiceListQuery>,
  use_case: web::Data<Arc<ListInvoicesUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let query = query.into_inner();

  let response = use_case
    .execute(ListInvoicesCommand {
      client_filter: query.client_id,
      status_filter: query.status,
      today: today(),
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}

/// Create invoice
/// POST /api/v1/invoices
pub async fn create_invoice_handler(
  request: web::Json<InvoiceRequest>,
  use_case: web::Data<Arc<CreateInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;
  let request = request.into_inner();

  let command = CreateInvoiceCommand {
    client_id: request.client_id,
    invoice_number: request.invoice_number,
    date_issued: request.date_issued,
    due_date: request.due_date,
    vat_exempt: request.vat_exempt,
    vat_exempt_reason: request.vat_exempt_reason,
    line_items: request.line_items.into_iter().map(Into::into).collect(),
    today: today(),
  };

  let response = use_case.execute(command).await?;

  Ok(HttpResponse::Created().json(response))
}

/// Get invoice with totals and display status
/// GET /api/v1/invoices/:invoice_id
pub async fn get_invoice_handler(
  invoice_id: web::Path<i64>,
  use_case: web::Data<Arc<GetInvoiceDetailsUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = use_case
    .execute(GetInvoiceDetailsCommand {
      invoice_id: invoice_id.into_inner(),
      today: today(),
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}

/// Replace an invoice's fields and its full line-item set
/// PUT /api/v1/invoices/:invoice_id
pub async fn update_invoice_handler(
  invoice_id: web::Path<i64>,
  request: web::Json<InvoiceRequest>,
  use_case: web::Data<Arc<UpdateInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;
  let request = request.into_inner();

  let date_issued = request
    .date_issued
    .ok_or_else(|| ApiError::Validation("date_issued is required".to_string()))?;

  let command = UpdateInvoiceCommand {
    invoice_id: invoice_id.into_inner(),
    client_id: request.client_id,
    invoice_number: request.invoice_number,
    date_issued,
    due_date: request.due_date,
    vat_exempt: request.vat_exempt,
    vat_exempt_reason: request.vat_exempt_reason,
    line_items: request.line_items.into_iter().map(Into::into).collect(),
    today: today(),
  };

  let response = use_case.execute(command).await?;

  Ok(HttpResponse::Ok().json(response))
}

/// Delete invoice and its line items. Irreversible.
/// DELETE /api/v1/invoices/:invoice_id
pub async fn delete_invoice_handler(
  invoice_id: web::Path<i64>,
  use_case: web::Data<Arc<DeleteInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  use_case
    .execute(DeleteInvoiceCommand {
      invoice_id: invoice_id.into_inner(),
    })
    .await?;

  Ok(HttpResponse::Ok().json(SuccessResponse {
    message: "Invoice deleted successfully".to_string(),
  }))
}

/// Set the stored status
/// POST /api/v1/invoices/:invoice_id/status
pub async fn change_status_handler(
  invoice_id: web::Path<i64>,
  request: web::Json<StatusChangeRequest>,
  use_case: web::Data<Arc<ChangeInvoiceStatusUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let response = use_case
    .execute(ChangeInvoiceStatusCommand {
      invoice_id: invoice_id.into_inner(),
      new_status: request.into_inner().status,
      today: today(),
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}

/// Mark paid and notify the configured webhook
///
/// The status change is committed regardless of the notification outcome,
/// which is reported in the response body.
/// POST /api/v1/invoices/:invoice_id/pay
pub async fn mark_paid_handler(
  invoice_id: web::Path<i64>,
  use_case: web::Data<Arc<MarkInvoicePaidUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = use_case
    .execute(MarkInvoicePaidCommand {
      invoice_id: invoice_id.into_inner(),
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}
