use actix_web::{http::StatusCode, HttpResponse};
use serde_json::json;

pub mod catalog;
pub mod health_check;
pub mod purchase;

fn error_response(status: StatusCode, msg: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "error": msg,
    }))
}

fn bad_request(msg: &str) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, msg)
}

/// Chain or gateway refused or failed the operation
fn bad_gateway(msg: &str) -> HttpResponse {
    error_response(StatusCode::BAD_GATEWAY, msg)
}

fn service_unavailable(msg: &str) -> HttpResponse {
    error_response(StatusCode::SERVICE_UNAVAILABLE, msg)
}
