//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>`, but additionally runs
//! `validator::Validate::validate()` on the deserialized value.
//! On validation failure it returns an automatic 422 response with
//! structured field-level error details.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::ApiResponse;
use crate::shared::{field_violations, Violations};

/// An extractor that deserializes JSON and validates it.
///
/// # Usage
///
/// ```ignore
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct Register {
///     #[validate(length(min = 1, max = 100))]
///     name: String,
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn handler(ValidatedJson(body): ValidatedJson<Register>) {
///     // `body` is guaranteed to pass validation
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

/// Error type for `ValidatedJson` extraction failures.
pub enum ValidatedJsonRejection {
    /// JSON parsing failed.
    JsonError(JsonRejection),
    /// Validation failed.
    ValidationError(validator::ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::JsonError(rejection) => {
                let body = ApiResponse::<()>::error(format!("Invalid JSON: {}", rejection));
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::ValidationError(errors) => {
                let message = Violations(&field_violations(&errors)).to_string();
                let message = if message.is_empty() {
                    "Validation failed".to_string()
                } else {
                    message
                };

                let body = ApiResponse::<()>::error(message);
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::interfaces::http::modules::auth::dto::RegisterRequest;
    use crate::interfaces::http::modules::stations::dto::StationRequest;

    async fn create_station(ValidatedJson(body): ValidatedJson<StationRequest>) -> String {
        body.address.unwrap_or_default()
    }

    async fn register(ValidatedJson(body): ValidatedJson<RegisterRequest>) -> String {
        body.email
    }

    fn app() -> Router {
        Router::new()
            .route("/stations", post(create_station))
            .route("/register", post(register))
    }

    async fn post_raw(uri: &str, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
        post_raw(uri, serde_json::to_vec(&body).unwrap()).await
    }

    fn error_of(bytes: &[u8]) -> String {
        let json: Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(json["success"], false);
        json["error"].as_str().unwrap().to_string()
    }

    fn station() -> Value {
        json!({
            "address": "Main St 1",
            "latitude": 40.0,
            "longitude": -74.0,
            "chargerType": "AC",
            "chargingPoints": 4,
            "status": "AVAILABLE"
        })
    }

    #[tokio::test]
    async fn valid_station_passes_through() {
        let (status, body) = post_json("/stations", station()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Main St 1");
    }

    #[tokio::test]
    async fn unreadable_body_is_400() {
        let (status, body) = post_raw("/stations", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_of(&body).starts_with("Invalid JSON"));

        let mut plasma = station();
        plasma["chargerType"] = json!("PLASMA");
        let (status, _) = post_json("/stations", plasma).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn station_violations_are_listed_per_field() {
        let body = json!({
            "address": "   ",
            "latitude": 95.0,
            "longitude": -74.0,
            "chargerType": "DC_FAST",
            "chargingPoints": 0
        });
        let (status, bytes) = post_json("/stations", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            error_of(&bytes),
            "address: must not be blank; chargingPoints: must be between 1 and 20; \
             latitude: must be between -90 and 90; status: is required"
        );
    }

    #[tokio::test]
    async fn register_rejects_bad_email_and_short_password() {
        let body = json!({"name": "Ada", "email": "ada-at-example", "password": "123"});
        let (status, bytes) = post_json("/register", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error = error_of(&bytes);
        assert!(error.contains("email: invalid email format"));
        assert!(error.contains("password: password must be 6-128 characters"));

        let body = json!({"name": "Ada", "email": "ada@example.com", "password": "s3cret-pass"});
        let (status, bytes) = post_json("/register", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"ada@example.com");
    }
}
