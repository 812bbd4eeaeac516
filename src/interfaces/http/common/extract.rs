//! Path and query extractors whose rejections use the API envelope

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::ApiResponse;

/// `axum::extract::Path` with a 400 envelope on malformed segments.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(BadRequest))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Query` with a 400 envelope on malformed parameters.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(BadRequest))]
pub struct ApiQuery<T>(pub T);

/// `axum::Json` with a 400 envelope on unreadable bodies and no field
/// validation.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(BadRequest))]
pub struct ApiJson<T>(pub T);

#[derive(Debug)]
pub struct BadRequest(pub String);

impl From<PathRejection> for BadRequest {
    fn from(rejection: PathRejection) -> Self {
        Self(rejection.body_text())
    }
}

impl From<QueryRejection> for BadRequest {
    fn from(rejection: QueryRejection) -> Self {
        Self(rejection.body_text())
    }
}

impl From<JsonRejection> for BadRequest {
    fn from(rejection: JsonRejection) -> Self {
        Self(format!("Invalid JSON: {}", rejection.body_text()))
    }
}

impl IntoResponse for BadRequest {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(ApiResponse::<()>::error(self.0))).into_response()
    }
}
