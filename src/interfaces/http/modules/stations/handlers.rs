//! Station API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::info;

use super::dto::{
    LocationRangeQuery, PageQuery, SearchQuery, StationDto, StationRequest, StatisticsDto,
    StatusQuery,
};
use crate::application::StationService;
use crate::domain::{ChargerType, DomainError, Station, StationStatus};
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiPath, ApiQuery, ApiResponse, ApiResult, PaginatedResponse,
    ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Station handler state
#[derive(Clone)]
pub struct StationHandlerState {
    pub service: Arc<StationService>,
}

fn to_dtos(stations: &[Station]) -> Vec<StationDto> {
    stations.iter().map(StationDto::from).collect()
}

fn list_response(result: Result<Vec<Station>, DomainError>) -> ApiResult<Vec<StationDto>> {
    match result {
        Ok(stations) => Ok(Json(ApiResponse::success(to_dtos(&stations)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/stations",
    tag = "Stations",
    responses(
        (status = 200, description = "All stations ordered by id", body = ApiResponse<Vec<StationDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_stations(State(state): State<StationHandlerState>) -> ApiResult<Vec<StationDto>> {
    list_response(state.service.get_all_stations().await)
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/paged",
    tag = "Stations",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of stations", body = ApiResponse<PaginatedResponse<StationDto>>),
        (status = 422, description = "Unknown sort field or direction")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_stations_paged(
    State(state): State<StationHandlerState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<PaginatedResponse<StationDto>> {
    let request = query.into_page_request().map_err(domain_error)?;
    let page = state
        .service
        .get_all_stations_paged(&request)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(page.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    params(("id" = i32, Path, description = "Station id")),
    responses(
        (status = 200, description = "Station found", body = ApiResponse<StationDto>),
        (status = 404, description = "Station not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_station(
    State(state): State<StationHandlerState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StationDto> {
    match state.service.get_station_by_id(id).await {
        Ok(Some(station)) => Ok(Json(ApiResponse::success(station.into()))),
        Ok(None) => Err(domain_error(DomainError::station_not_found(id))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/stations",
    tag = "Stations",
    request_body = StationRequest,
    responses(
        (status = 200, description = "Station created", body = ApiResponse<StationDto>),
        (status = 409, description = "Address already in use"),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_station(
    State(state): State<StationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<StationRequest>,
) -> ApiResult<StationDto> {
    let details = body.into_details().map_err(domain_error)?;
    let station = state
        .service
        .create_station(details)
        .await
        .map_err(domain_error)?;

    info!(user_id = %user.user_id, station_id = station.id, "Station created via API");
    Ok(Json(ApiResponse::success(station.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    params(("id" = i32, Path, description = "Station id")),
    request_body = StationRequest,
    responses(
        (status = 200, description = "Station replaced", body = ApiResponse<StationDto>),
        (status = 404, description = "Station not found"),
        (status = 409, description = "Address already in use"),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_station(
    State(state): State<StationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(body): ValidatedJson<StationRequest>,
) -> ApiResult<StationDto> {
    let details = body.into_details().map_err(domain_error)?;
    let station = state
        .service
        .update_station(id, details)
        .await
        .map_err(domain_error)?;

    info!(user_id = %user.user_id, station_id = id, "Station updated via API");
    Ok(Json(ApiResponse::success(station.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    params(("id" = i32, Path, description = "Station id")),
    responses(
        (status = 204, description = "Station deleted"),
        (status = 404, description = "Station not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_station(
    State(state): State<StationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_station(id).await.map_err(domain_error)?;

    info!(user_id = %user.user_id, station_id = id, "Station deleted via API");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/charger-type/{charger_type}",
    tag = "Stations",
    params(("charger_type" = ChargerType, Path, description = "AC or DC_FAST")),
    responses(
        (status = 200, description = "Stations with the charger type", body = ApiResponse<Vec<StationDto>>),
        (status = 400, description = "Unknown charger type")
    ),
    security(("bearer_auth" = []))
)]
pub async fn stations_by_charger_type(
    State(state): State<StationHandlerState>,
    ApiPath(charger_type): ApiPath<ChargerType>,
) -> ApiResult<Vec<StationDto>> {
    list_response(state.service.get_stations_by_charger_type(charger_type).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/status/{status}",
    tag = "Stations",
    params(("status" = StationStatus, Path, description = "AVAILABLE or IN_USE")),
    responses(
        (status = 200, description = "Stations with the status", body = ApiResponse<Vec<StationDto>>),
        (status = 400, description = "Unknown status")
    ),
    security(("bearer_auth" = []))
)]
pub async fn stations_by_status(
    State(state): State<StationHandlerState>,
    ApiPath(status): ApiPath<StationStatus>,
) -> ApiResult<Vec<StationDto>> {
    list_response(state.service.get_stations_by_status(status).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/available",
    tag = "Stations",
    responses(
        (status = 200, description = "Available stations (cached)", body = ApiResponse<Vec<StationDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn available_stations(
    State(state): State<StationHandlerState>,
) -> ApiResult<Vec<StationDto>> {
    match state.service.get_available_stations().await {
        Ok(stations) => Ok(Json(ApiResponse::success(to_dtos(&stations)))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/in-use",
    tag = "Stations",
    responses(
        (status = 200, description = "Stations currently in use", body = ApiResponse<Vec<StationDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn in_use_stations(State(state): State<StationHandlerState>) -> ApiResult<Vec<StationDto>> {
    list_response(state.service.get_in_use_stations().await)
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/location-range",
    tag = "Stations",
    params(LocationRangeQuery),
    responses(
        (status = 200, description = "Stations inside the bounding box (inclusive)", body = ApiResponse<Vec<StationDto>>),
        (status = 400, description = "Missing or malformed bound")
    ),
    security(("bearer_auth" = []))
)]
pub async fn stations_in_location_range(
    State(state): State<StationHandlerState>,
    ApiQuery(query): ApiQuery<LocationRangeQuery>,
) -> ApiResult<Vec<StationDto>> {
    list_response(
        state
            .service
            .find_stations_by_location_range(query.into())
            .await,
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/search",
    tag = "Stations",
    params(SearchQuery),
    responses(
        (status = 200, description = "Stations whose address contains the text", body = ApiResponse<Vec<StationDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_stations(
    State(state): State<StationHandlerState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Vec<StationDto>> {
    list_response(state.service.search_stations_by_address(&query.address).await)
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/min-points/{min_points}",
    tag = "Stations",
    params(("min_points" = i32, Path, description = "Minimum number of charging points")),
    responses(
        (status = 200, description = "Stations with at least that many points", body = ApiResponse<Vec<StationDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn stations_with_min_points(
    State(state): State<StationHandlerState>,
    ApiPath(min_points): ApiPath<i32>,
) -> ApiResult<Vec<StationDto>> {
    list_response(
        state
            .service
            .get_stations_with_min_charging_points(min_points)
            .await,
    )
}

#[utoipa::path(
    patch,
    path = "/api/v1/stations/{id}/status",
    tag = "Stations",
    params(("id" = i32, Path, description = "Station id"), StatusQuery),
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<StationDto>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Station not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_station_status(
    State(state): State<StationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<StatusQuery>,
) -> ApiResult<StationDto> {
    let station = state
        .service
        .change_station_status(id, query.status)
        .await
        .map_err(domain_error)?;

    info!(user_id = %user.user_id, station_id = id, status = %query.status, "Station status changed via API");
    Ok(Json(ApiResponse::success(station.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/statistics",
    tag = "Stations",
    responses(
        (status = 200, description = "Station counts and percentages", body = ApiResponse<StatisticsDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn station_statistics(State(state): State<StationHandlerState>) -> ApiResult<StatisticsDto> {
    let stats = state.service.get_statistics().await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(stats.into())))
}
