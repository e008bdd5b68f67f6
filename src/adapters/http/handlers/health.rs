use actix_web::HttpResponse;

/// Liveness probe
/// GET /api/v1/health
pub async fn health_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
