pub mod health_handlers;
pub mod log_handlers;
pub mod stats_handlers;
pub mod track_handlers;

use actix_web::HttpResponse;

/// Generic failure response: the raw error message with a 500 status.
/// Parse and store failures alike are surfaced this way.
pub(crate) fn error_response(err: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": err.to_string() }))
}
