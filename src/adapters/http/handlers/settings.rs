use actix_web::{HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use crate::{
  adapters::http::{
    dtos::{SettingsRequest, TestWebhookRequest},
    errors::ApiError,
  },
  application::settings::{
    GetSettingsUseCase, TestWebhookCommand, TestWebhookUseCase, UpdateSettingsCommand,
    UpdateSettingsUseCase,
  },
};

/// GET /api/v1/settings
pub async fn get_settings_handler(
  use_case: web::Data<Arc<GetSettingsUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let settings = use_case.execute().await?;
  Ok(HttpResponse::Ok().json(settings))
}

/// PUT /api/v1/settings
pub async fn update_settings_handler(
  request: web::Json<SettingsRequest>,
  use_case: web::Data<Arc<UpdateSettingsUseCase>>,
) -> Result<HttpResponse, ApiError> {
  request.validate()?;
  let request = request.into_inner();

  let command = UpdateSettingsCommand {
    sender_name: request.sender_name,
    sender_address_line1: request.sender_address_line1,
    sender_address_line2: request.sender_address_line2,
    sender_address_line3: request.sender_address_line3,
    sender_email: request.sender_email,
    sender_phone: request.sender_phone,
    tax_id: request.tax_id,
    bank_iban: request.bank_iban,
    bank_account_holder: request.bank_account_holder,
    bank_swift: request.bank_swift,
    vat_percentage: request.vat_percentage,
    default_vat_exempt_reason: request.default_vat_exempt_reason,
    webhook_url: request.webhook_url,
  };

  let settings = use_case.execute(command).await?;

  tracing::info!("Settings updated");
  Ok(HttpResponse::Ok().json(settings))
}

/// Send a test message; an empty body uses the saved webhook URL
/// POST /api/v1/settings/test-webhook
pub async fn test_webhook_handler(
  request: Option<web::Json<TestWebhookRequest>>,
  use_case: web::Data<Arc<TestWebhookUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let request = request.map(web::Json::into_inner).unwrap_or_default();
  request.validate()?;

  let response = use_case
    .execute(TestWebhookCommand {
      webhook_url: request.webhook_url,
    })
    .await?;

  Ok(HttpResponse::Ok().json(response))
}
