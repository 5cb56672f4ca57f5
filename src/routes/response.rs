//! Response builders shared by all handlers

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CACHE_CONTROL, CONTENT_TYPE,
};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::{error, warn};

use crate::types::RecordError;

pub type ApiResponse = Response<Full<Bytes>>;

fn with_body(status: StatusCode, body: Bytes) -> ApiResponse {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// JSON response with the given status
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> ApiResponse {
    match serde_json::to_vec(body) {
        Ok(bytes) => with_body(status, Bytes::from(bytes)),
        Err(e) => error_response(RecordError::Internal(format!(
            "response serialization failed: {e}"
        ))),
    }
}

pub fn ok<T: Serialize>(body: &T) -> ApiResponse {
    json_response(StatusCode::OK, body)
}

pub fn created<T: Serialize>(body: &T) -> ApiResponse {
    json_response(StatusCode::CREATED, body)
}

/// 204 with no body, used for updates and deletes
pub fn no_content() -> ApiResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

/// `{"error": ..., "code": ...}` with the translated status
pub fn error_response(err: RecordError) -> ApiResponse {
    match &err {
        RecordError::Store(store) => warn!(
            status = store.status,
            message = %store.message,
            "store operation failed"
        ),
        RecordError::Upstream(message) => warn!(message = %message, "upstream request failed"),
        RecordError::Internal(message) | RecordError::Config(message) => {
            error!(message = %message, "internal error")
        }
        _ => {}
    }

    let code = err.code();
    let (status, message) = err.into_status_code_and_body();
    let body = serde_json::json!({
        "error": message,
        "code": code,
    });

    with_body(status, Bytes::from(body.to_string()))
}

/// CORS preflight response
pub fn preflight_response() -> ApiResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Authorization, Content-Type"),
    );
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    response
}

/// Stamp the configured origin on any response
pub fn apply_cors(response: &mut ApiResponse, origin: &HeaderValue) {
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
}
