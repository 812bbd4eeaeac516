//! Shared HTTP response types and extractors

pub mod extract;
pub mod validated_json;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::DomainError;
use crate::shared::PaginatedResult;

pub use extract::{ApiJson, ApiPath, ApiQuery, BadRequest};
pub use validated_json::ValidatedJson;

/// Standard API response envelope
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error half of every handler result. Error envelopes never carry data.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// A page of items plus navigation counts
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T, U: From<T>> From<PaginatedResult<T>> for PaginatedResponse<U> {
    fn from(result: PaginatedResult<T>) -> Self {
        let result = result.map(U::from);
        Self {
            items: result.items,
            total: result.total,
            page: result.page,
            limit: result.limit,
            total_pages: result.total_pages,
        }
    }
}

pub fn domain_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::DuplicateAddress(_) => StatusCode::CONFLICT,
        DomainError::DuplicateEmail(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps a domain failure onto its status code and envelope.
///
/// Store failures are logged and reported without internal detail.
pub fn domain_error(error: DomainError) -> ApiError {
    let status = domain_status(&error);
    let message = match &error {
        DomainError::Storage(detail) => {
            error!(error = %detail, "Storage failure");
            "Internal server error".to_string()
        }
        DomainError::DuplicateEmail(_) => "Email already exists".to_string(),
        DomainError::Unauthorized(reason) => reason.clone(),
        other => other.to_string(),
    };
    (status, Json(ApiResponse::error(message)))
}
