use actix_web::{
  HttpResponse,
  error::ResponseError,
  http::{StatusCode, header::ContentType},
};
use std::fmt;

use crate::domain::backup::{BackupError, SnapshotViolation};
use crate::domain::invoice::InvoiceError;

use super::dtos::ErrorResponse;

/// API error type that maps domain errors to HTTP responses
#[derive(Debug)]
pub enum ApiError {
  /// Validation error (400 Bad Request)
  Validation(String),

  /// Unknown client or invoice (404 Not Found)
  NotFound(String),

  /// Duplicate invoice number or client still referenced (409 Conflict)
  Conflict(String),

  /// Snapshot rejected by integrity checks (422 Unprocessable Entity)
  Integrity(Vec<SnapshotViolation>),

  /// Internal server error (500 Internal Server Error)
  Internal(String),
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
      ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
      ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
      ApiError::Integrity(violations) => {
        write!(f, "Integrity error: {} violation(s)", violations.len())
      }
      ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Integrity(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let (error_type, message, details) = match self {
      ApiError::Validation(msg) => ("validation_error", msg.clone(), None),
      ApiError::NotFound(msg) => ("not_found", msg.clone(), None),
      ApiError::Conflict(msg) => ("conflict", msg.clone(), None),
      ApiError::Integrity(violations) => (
        "integrity_error",
        format!(
          "Import rejected: {} integrity violation(s); existing data was left untouched",
          violations.len()
        ),
        serde_json::to_value(violations).ok(),
      ),
      ApiError::Internal(msg) => {
        // Don't expose internal error details in production
        tracing::error!("Internal error: {}", msg);
        (
          "internal_error",
          "An internal server error occurred".to_string(),
          None,
        )
      }
    };

    let error_response = ErrorResponse {
      error: error_type.to_string(),
      message,
      details,
    };

    HttpResponse::build(status)
      .content_type(ContentType::json())
      .json(error_response)
  }
}

/// Convert InvoiceError to ApiError
impl From<InvoiceError> for ApiError {
  fn from(error: InvoiceError) -> Self {
    match error {
      InvoiceError::ClientNotFound(_) | InvoiceError::InvoiceNotFound(_) => {
        ApiError::NotFound(error.to_string())
      }
      InvoiceError::Validation(_)
      | InvoiceError::DueDateBeforeIssueDate { .. }
      | InvoiceError::InvalidStatus(_) => ApiError::Validation(error.to_string()),
      InvoiceError::InvoiceNumberAlreadyExists { .. } | InvoiceError::ClientHasInvoices { .. } => {
        ApiError::Conflict(error.to_string())
      }
      InvoiceError::Notification(_) | InvoiceError::Repository(_) | InvoiceError::Database(_) => {
        ApiError::Internal(error.to_string())
      }
    }
  }
}

/// Convert BackupError to ApiError
impl From<BackupError> for ApiError {
  fn from(error: BackupError) -> Self {
    match error {
      BackupError::Malformed(msg) => ApiError::Validation(format!("Malformed snapshot: {}", msg)),
      BackupError::Integrity(violations) => ApiError::Integrity(violations),
      BackupError::Repository(_) | BackupError::Database(_) => {
        ApiError::Internal(error.to_string())
      }
    }
  }
}

/// Convert validation errors from validator crate
impl From<validator::ValidationErrors> for ApiError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let messages: Vec<String> = errors
      .field_errors()
      .iter()
      .flat_map(|(field, errors)| {
        errors
          .iter()
          .map(|error| {
            error
              .message
              .as_ref()
              .map(|m| m.to_string())
              .unwrap_or_else(|| format!("Invalid field: {}", field))
          })
          .collect::<Vec<_>>()
      })
      .collect();

    ApiError::Validation(messages.join(", "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::ValueObjectError;
  use actix_web::body::to_bytes;

  #[test]
  fn test_api_error_status_codes() {
    assert_eq!(
      ApiError::Validation("test".to_string()).status_code(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      ApiError::NotFound("test".to_string()).status_code(),
      StatusCode::NOT_FOUND
    );
    assert_eq!(
      ApiError::Conflict("test".to_string()).status_code(),
      StatusCode::CONFLICT
    );
    assert_eq!(
      ApiError::Integrity(vec![]).status_code(),
      StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
      ApiError::Internal("test".to_string()).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn test_invoice_error_conversion() {
    let api_error: ApiError = InvoiceError::InvoiceNotFound(7).into();
    assert_eq!(api_error.status_code(), StatusCode::NOT_FOUND);

    let api_error: ApiError = InvoiceError::InvoiceNumberAlreadyExists {
      client_id: 1,
      invoice_number: "ACM-1".to_string(),
    }
    .into();
    assert_eq!(api_error.status_code(), StatusCode::CONFLICT);

    let api_error: ApiError = InvoiceError::ClientHasInvoices {
      client_id: 1,
      invoice_count: 2,
    }
    .into();
    assert_eq!(api_error.status_code(), StatusCode::CONFLICT);

    let api_error: ApiError = InvoiceError::Validation(ValueObjectError::InvalidClientName(
      "Client name cannot be empty".to_string(),
    ))
    .into();
    assert_eq!(api_error.status_code(), StatusCode::BAD_REQUEST);

    let api_error: ApiError = InvoiceError::Repository("boom".to_string()).into();
    assert_eq!(api_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn test_backup_error_conversion() {
    let api_error: ApiError = BackupError::Malformed("eof".to_string()).into();
    assert_eq!(api_error.status_code(), StatusCode::BAD_REQUEST);

    let api_error: ApiError = BackupError::Integrity(vec![]).into();
    assert_eq!(api_error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[actix_web::test]
  async fn test_integrity_response_lists_violations() {
    let error = ApiError::Integrity(vec![SnapshotViolation::new(
      "invoice",
      Some(3),
      "client_id",
      "references unknown client 9",
    )]);

    let body = to_bytes(error.error_response().into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"], "integrity_error");
    assert_eq!(json["details"][0]["entity"], "invoice");
    assert_eq!(json["details"][0]["id"], 3);
    assert_eq!(json["details"][0]["field"], "client_id");
  }

  #[actix_web::test]
  async fn test_internal_error_hides_details() {
    let error = ApiError::Internal("connection reset".to_string());

    let body = to_bytes(error.error_response().into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"], "internal_error");
    assert!(!json["message"].as_str().unwrap().contains("connection reset"));
  }
}
