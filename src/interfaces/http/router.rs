//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{StationService, UserService};
use crate::domain::{ChargerType, StationRepository, StationStatus};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ApiResponse, PaginatedResponse};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};

use super::modules::{auth, health, metrics, request_id, stations};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::register,
        // Stations
        stations::list_stations,
        stations::list_stations_paged,
        stations::get_station,
        stations::create_station,
        stations::update_station,
        stations::delete_station,
        stations::stations_by_charger_type,
        stations::stations_by_status,
        stations::available_stations,
        stations::in_use_stations,
        stations::stations_in_location_range,
        stations::search_stations,
        stations::stations_with_min_points,
        stations::change_station_status,
        stations::station_statistics,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            PaginatedResponse<stations::StationDto>,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterRequest,
            auth::RegisterResponse,
            // Stations
            ChargerType,
            StationStatus,
            stations::StationRequest,
            stations::StationDto,
            stations::StatisticsDto,
            // Health
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Authentication", description = "User registration and login (JWT)"),
        (name = "Stations", description = "Charging station registry"),
    ),
    info(
        title = "Charging Station Service API",
        version = "1.0.0",
        description = "REST API for managing EV charging stations",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Everything the HTTP layer needs from the rest of the application.
pub struct ApiDependencies {
    pub stations: Arc<StationService>,
    /// Probed by `/health`
    pub station_repository: Arc<dyn StationRepository>,
    pub users: Arc<UserService>,
    pub jwt_config: JwtConfig,
    /// `/metrics` is mounted only when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

/// Create the API router with all routes
pub fn create_api_router(deps: ApiDependencies) -> Router {
    let middleware_state = AuthState {
        jwt_config: deps.jwt_config,
    };

    // Station routes (protected)
    let station_state = stations::StationHandlerState {
        service: deps.stations,
    };
    let station_routes = Router::new()
        .route(
            "/",
            get(stations::list_stations).post(stations::create_station),
        )
        .route("/paged", get(stations::list_stations_paged))
        .route("/available", get(stations::available_stations))
        .route("/in-use", get(stations::in_use_stations))
        .route("/statistics", get(stations::station_statistics))
        .route("/search", get(stations::search_stations))
        .route(
            "/location-range",
            get(stations::stations_in_location_range),
        )
        .route(
            "/charger-type/{charger_type}",
            get(stations::stations_by_charger_type),
        )
        .route("/status/{status}", get(stations::stations_by_status))
        .route(
            "/min-points/{min_points}",
            get(stations::stations_with_min_points),
        )
        .route(
            "/{id}",
            get(stations::get_station)
                .put(stations::update_station)
                .delete(stations::delete_station),
        )
        .route("/{id}/status", patch(stations::change_station_status))
        .layer(middleware::from_fn_with_state(
            middleware_state,
            auth_middleware,
        ))
        .with_state(station_state);

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .with_state(auth::AuthHandlerState { users: deps.users });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            stations: deps.station_repository,
            started_at: Arc::new(Instant::now()),
        });

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Health
        .merge(health_routes)
        // Auth
        .nest("/api/v1/auth", auth_routes)
        // Stations
        .nest("/api/v1/stations", station_routes);

    if let Some(handle) = deps.metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::application::AvailableStationsCache;
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::storage::{InMemoryStationRepository, InMemoryUserRepository};

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "router-test-secret".into(),
            ..JwtConfig::default()
        }
    }

    fn app() -> Router {
        let repo: Arc<dyn StationRepository> = Arc::new(InMemoryStationRepository::new());
        let cache = Arc::new(AvailableStationsCache::default());
        create_api_router(ApiDependencies {
            stations: Arc::new(StationService::new(repo.clone(), cache)),
            station_repository: repo,
            users: Arc::new(UserService::new(
                Arc::new(InMemoryUserRepository::new()),
                jwt_config(),
            )),
            jwt_config: jwt_config(),
            metrics: None,
        })
    }

    fn bearer() -> String {
        let token = create_token("user-1", "ada@example.com", "USER", &jwt_config()).unwrap();
        format!("Bearer {}", token)
    }

    fn station_body(address: &str) -> Value {
        json!({
            "address": address,
            "latitude": 40.0,
            "longitude": -74.0,
            "chargerType": "AC",
            "chargingPoints": 4,
            "status": "AVAILABLE"
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, bearer());
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn station_routes_require_a_token() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/stations")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/stations")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_read_update_delete() {
        let app = app();

        let (status, body) = send(&app, "POST", "/api/v1/stations", Some(station_body("Main St 1"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], 1);
        assert_eq!(body["data"]["chargerType"], "AC");

        let (status, body) = send(&app, "GET", "/api/v1/stations/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["address"], "Main St 1");

        let mut replacement = station_body("Elm St 2");
        replacement["chargingPoints"] = json!(10);
        let (status, body) = send(&app, "PUT", "/api/v1/stations/1", Some(replacement)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["chargingPoints"], 10);

        let (status, body) = send(&app, "DELETE", "/api/v1/stations/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = send(&app, "GET", "/api/v1/stations/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn error_statuses() {
        let app = app();
        send(&app, "POST", "/api/v1/stations", Some(station_body("Main St 1"))).await;

        let (status, body) = send(&app, "POST", "/api/v1/stations", Some(station_body("Main St 1"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "A station with address 'Main St 1' already exists");

        let mut invalid = station_body("Other");
        invalid["latitude"] = json!(95.0);
        let (status, body) = send(&app, "POST", "/api/v1/stations", Some(invalid)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("latitude"));

        let (status, _) = send(&app, "GET", "/api/v1/stations/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "GET", "/api/v1/stations/charger-type/PLASMA", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "DELETE", "/api/v1/stations/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "GET", "/api/v1/stations/paged?sort=password", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn status_change_and_statistics() {
        let app = app();
        send(&app, "POST", "/api/v1/stations", Some(station_body("Main St 1"))).await;

        let (_, body) = send(&app, "GET", "/api/v1/stations/available", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, "PATCH", "/api/v1/stations/1/status?status=IN_USE", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "IN_USE");

        let (_, body) = send(&app, "GET", "/api/v1/stations/available", None).await;
        assert!(body["data"].as_array().unwrap().is_empty());

        let (_, body) = send(&app, "GET", "/api/v1/stations/in-use", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, "GET", "/api/v1/stations/statistics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"],
            json!({
                "totalStations": 1,
                "availableStations": 0,
                "inUseStations": 1,
                "availabilityPercentage": 0.0,
                "usagePercentage": 100.0
            })
        );
    }

    #[tokio::test]
    async fn filtered_queries() {
        let app = app();
        send(&app, "POST", "/api/v1/stations", Some(station_body("Main Street 1"))).await;
        let mut fast = station_body("Harbour Road");
        fast["chargerType"] = json!("DC_FAST");
        fast["chargingPoints"] = json!(12);
        fast["latitude"] = json!(10.0);
        fast["longitude"] = json!(20.0);
        send(&app, "POST", "/api/v1/stations", Some(fast)).await;

        let (_, body) = send(&app, "GET", "/api/v1/stations/search?address=main", None).await;
        assert_eq!(body["data"][0]["address"], "Main Street 1");

        let (_, body) = send(&app, "GET", "/api/v1/stations/charger-type/DC_FAST", None).await;
        assert_eq!(body["data"][0]["address"], "Harbour Road");

        let (_, body) = send(&app, "GET", "/api/v1/stations/min-points/5", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) = send(
            &app,
            "GET",
            "/api/v1/stations/location-range?minLat=10&maxLat=10&minLon=20&maxLon=20",
            None,
        )
        .await;
        assert_eq!(body["data"][0]["address"], "Harbour Road");

        let (status, _) = send(&app, "GET", "/api/v1/stations/location-range?minLat=10", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, "GET", "/api/v1/stations/status/AVAILABLE", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (_, body) = send(&app, "GET", "/api/v1/stations/paged?page=2&limit=1", None).await;
        assert_eq!(body["data"]["items"][0]["address"], "Harbour Road");
        assert_eq!(body["data"]["totalPages"], 2);
    }

    #[tokio::test]
    async fn register_and_login() {
        let app = app();

        let register = json!({"name": "Ada", "email": "ada@example.com", "password": "s3cret-pass"});
        let (status, body) = send(&app, "POST", "/api/v1/auth/register", Some(register.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["message"], "User registered successfully");

        let (status, body) = send(&app, "POST", "/api/v1/auth/register", Some(register)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email already exists");

        let login = json!({"email": "ada@example.com", "password": "s3cret-pass"});
        let (status, body) = send(&app, "POST", "/api/v1/auth/login", Some(login)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tokenType"], "Bearer");
        assert_eq!(body["data"]["email"], "ada@example.com");
        assert!(body["data"]["token"].as_str().is_some());

        let wrong = json!({"email": "ada@example.com", "password": "nope"});
        let (status, body) = send(&app, "POST", "/api/v1/auth/login", Some(wrong)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn unusable_login_credentials_get_the_uniform_401() {
        let app = app();

        for credentials in [
            json!({"email": "not-an-email", "password": "s3cret-pass"}),
            json!({"email": "ada@example.com", "password": ""}),
        ] {
            let (status, body) = send(&app, "POST", "/api/v1/auth/login", Some(credentials)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], "Invalid credentials");
        }

        let (status, body) = send(&app, "POST", "/api/v1/auth/login", Some(json!({"email": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn oversized_page_number_is_rejected() {
        let app = app();
        let uri = format!("/api/v1/stations/paged?page={}", u64::MAX);
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("page"));
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn openapi_lists_station_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/stations/{id}/status"));
        assert!(doc.paths.paths.contains_key("/api/v1/auth/login"));
    }
}
