//! JSON response envelope shared by every dashboard endpoint.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};

/// `{success, code, message, data}`
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub code: u16,
    pub message: String,
    pub data: T,
}

pub fn ok<T: Serialize>(message: &str, data: T) -> Response {
    reply(StatusCode::OK, true, message, data)
}

pub fn error(status: StatusCode, message: &str) -> Response {
    reply(status, false, message, json!({}))
}

pub fn method_not_allowed() -> Response {
    error(StatusCode::METHOD_NOT_ALLOWED, "http method not valid")
}

fn reply<T: Serialize>(status: StatusCode, success: bool, message: &str, data: T) -> Response {
    let body = Envelope {
        success,
        code: status.as_u16(),
        message: message.to_string(),
        data,
    };

    (status, Json(body)).into_response()
}

/// The services listing carries the dashboard title next to the envelope
/// fields.
#[derive(Debug, Serialize)]
pub struct ServicesEnvelope<T: Serialize> {
    pub success: bool,
    pub code: u16,
    pub message: String,
    pub data: T,
    #[serde(rename = "dashboardTitle")]
    pub dashboard_title: String,
}

pub fn services_ok<T: Serialize>(title: &str, data: T) -> Response {
    let body = ServicesEnvelope {
        success: true,
        code: 200,
        message: "get all services succeed".to_string(),
        data,
        dashboard_title: title.to_string(),
    };

    (StatusCode::OK, Json(body)).into_response()
}

/// Convenience for 401 bodies.
pub fn unauthorized(message: &str) -> Response {
    error(StatusCode::UNAUTHORIZED, message)
}

pub fn bad_request(message: &str) -> Response {
    error(StatusCode::BAD_REQUEST, message)
}

#[allow(dead_code)]
pub fn empty() -> Value {
    json!({})
}
