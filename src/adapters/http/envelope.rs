//! The JSON envelope every endpoint answers with:
//! `{success, statusCode, message, data?, error?}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::app_error::ErrorCode;

pub fn ok(status: StatusCode, message: &str, data: impl Serialize) -> Response {
    (
        status,
        Json(json!({
            "success": true,
            "statusCode": status.as_u16(),
            "message": message,
            "data": data,
        })),
    )
        .into_response()
}

pub fn ok_empty(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": true,
            "statusCode": status.as_u16(),
            "message": message,
        })),
    )
        .into_response()
}

pub fn fail(status: StatusCode, code: ErrorCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "statusCode": status.as_u16(),
            "message": message,
            "error": { "code": code.as_str() },
        })),
    )
        .into_response()
}
