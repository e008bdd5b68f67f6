use actix_web::{HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use crate::{
  adapters::http::{
    dtos::{ClientRequest, SuccessResponse},
    errors::ApiError,
  },
  application::invoice::{
    CreateClientCommand, CreateClientUseCase, DeleteClientCommand, DeleteClientUseCase,
    GetClientCommand, GetClientUseCase, ListClientsCommand, ListClientsUseCase,
    UpdateClientCommand, UpdateClientUseCase,
  },
};

impl From<ClientRequest> for CreateClientCommand {
  fn from(request: ClientRequest) -> Self {
    Self {
      name: request.name,
      address: request.address,
      email: request.email,
      phone: request.phone,
      category: request.category,
    }
  }
}

/// List clients
/// GET /api/v1/clients
pub async fn list_clients_handler(
  use_case: web::Data<Arc<ListClientsUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = use_case.execute(ListClientsCommand::default()).await?;
  Ok(HttpResponse::Ok().json(response))
}

/// Create client
/// POST /api/v1/clients
pub async fn create_client_handler(
  request: web::Json<ClientRequest>,
  use_case: web::Data<Arc<CreateClientUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let client = use_case.execute(request.into_inner().into()).await?;

  Ok(HttpResponse::Created().json(client))
}

/// Get client
/// GET /api/v1/clients/:client_id
pub async fn get_client_handler(
  client_id: web::Path<i64>,
  use_case: web::Data<Arc<GetClientUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let client = use_case
    .execute(GetClientCommand {
      client_id: client_id.into_inner(),
    })
    .await?;

  Ok(HttpResponse::Ok().json(client))
}

/// Update client
/// PUT /api/v1/clients/:client_id
pub async fn update_client_handler(
  client_id: web::Path<i64>,
  request: web::Json<ClientRequest>,
  use_case: web::Data<Arc<UpdateClientUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;

  let client = use_case
    .execute(UpdateClientCommand {
      client_id: client_id.into_inner(),
      details: request.into_inner().into(),
    })
    .await?;

  Ok(HttpResponse::Ok().json(client))
}

/// Delete client. Irreversible; rejected while the client has invoices.
/// DELETE /api/v1/clients/:client_id
pub async fn delete_client_handler(
  client_id: web::Path<i64>,
  use_case: web::Data<Arc<DeleteClientUseCase>>,
) -> Result<HttpResponse, ApiError> {
  use_case
    .execute(DeleteClientCommand {
      client_id: client_id.into_inner(),
    })
    .await?;

  Ok(HttpResponse::Ok().json(SuccessResponse {
    message: "Client deleted successfully".to_string(),
  }))
}
