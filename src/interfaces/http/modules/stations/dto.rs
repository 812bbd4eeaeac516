//! Station DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{
    ChargerType, DomainError, LocationRange, Station, StationDetails, StationStatistics,
    StationStatus,
};
use crate::shared::{PageRequest, SortSpec};

/// Body of create and full-replace requests. Every field is mandatory.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationRequest {
    #[validate(
        required(message = "must not be blank"),
        custom(function = "crate::shared::not_blank")
    )]
    #[schema(example = "Main St 1")]
    pub address: Option<String>,
    #[validate(
        required(message = "is required"),
        range(min = -90.0, max = 90.0, message = "must be between -90 and 90")
    )]
    #[schema(example = 40.0)]
    pub latitude: Option<f64>,
    #[validate(
        required(message = "is required"),
        range(min = -180.0, max = 180.0, message = "must be between -180 and 180")
    )]
    #[schema(example = -74.0)]
    pub longitude: Option<f64>,
    #[validate(required(message = "is required"))]
    pub charger_type: Option<ChargerType>,
    #[validate(
        required(message = "is required"),
        range(min = 1, max = 20, message = "must be between 1 and 20")
    )]
    #[schema(example = 4)]
    pub charging_points: Option<i32>,
    #[validate(required(message = "is required"))]
    pub status: Option<StationStatus>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, DomainError> {
    value.ok_or_else(|| DomainError::invalid(field, "is required"))
}

impl StationRequest {
    pub fn into_details(self) -> Result<StationDetails, DomainError> {
        Ok(StationDetails {
            address: required(self.address, "address")?,
            latitude: required(self.latitude, "latitude")?,
            longitude: required(self.longitude, "longitude")?,
            charger_type: required(self.charger_type, "chargerType")?,
            charging_points: required(self.charging_points, "chargingPoints")?,
            status: required(self.status, "status")?,
        })
    }
}

/// Station API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationDto {
    pub id: i32,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub charger_type: ChargerType,
    pub charging_points: i32,
    pub status: StationStatus,
}

impl From<&Station> for StationDto {
    fn from(station: &Station) -> Self {
        Self {
            id: station.id,
            address: station.address.clone(),
            latitude: station.latitude,
            longitude: station.longitude,
            charger_type: station.charger_type,
            charging_points: station.charging_points,
            status: station.status,
        }
    }
}

impl From<Station> for StationDto {
    fn from(station: Station) -> Self {
        Self {
            id: station.id,
            address: station.address,
            latitude: station.latitude,
            longitude: station.longitude,
            charger_type: station.charger_type,
            charging_points: station.charging_points,
            status: station.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsDto {
    pub total_stations: u64,
    pub available_stations: u64,
    pub in_use_stations: u64,
    pub availability_percentage: f64,
    pub usage_percentage: f64,
}

impl From<StationStatistics> for StatisticsDto {
    fn from(stats: StationStatistics) -> Self {
        Self {
            total_stations: stats.total_stations,
            available_stations: stats.available_stations,
            in_use_stations: stats.in_use_stations,
            availability_percentage: stats.availability_percentage(),
            usage_percentage: stats.usage_percentage(),
        }
    }
}

/// `?page=1&limit=20&sort=address,desc`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    pub page: Option<u64>,
    /// Page size, clamped to 1..=100 (default 20)
    pub limit: Option<u64>,
    /// `field[,asc|desc]`
    pub sort: Option<String>,
}

impl PageQuery {
    pub fn into_page_request(self) -> Result<PageRequest, DomainError> {
        let sort = self.sort.as_deref().map(SortSpec::parse).transpose()?;
        let request = PageRequest::new(self.page, self.limit, sort);
        if request.checked_offset().is_none() {
            return Err(DomainError::invalid("page", "is too large"));
        }
        Ok(request)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct LocationRangeQuery {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl From<LocationRangeQuery> for LocationRange {
    fn from(query: LocationRangeQuery) -> Self {
        Self {
            min_lat: query.min_lat,
            max_lat: query.max_lat,
            min_lon: query.min_lon,
            max_lon: query.max_lon,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring of the address
    pub address: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    pub status: StationStatus,
}
