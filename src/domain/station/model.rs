//! Station domain entity

use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::{DomainError, FieldViolation, SortDirection, SortSpec};

pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;
pub const CHARGING_POINTS_RANGE: RangeInclusive<i32> = 1..=20;

/// Charger classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargerType {
    Ac,
    DcFast,
}

impl ChargerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ac => "AC",
            Self::DcFast => "DC_FAST",
        }
    }
}

impl FromStr for ChargerType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AC" => Ok(Self::Ac),
            "DC_FAST" => Ok(Self::DcFast),
            other => Err(DomainError::invalid(
                "chargerType",
                format!("unknown charger type '{}'", other),
            )),
        }
    }
}

impl fmt::Display for ChargerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational status. Any actor may flip it in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StationStatus {
    Available,
    InUse,
}

impl StationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::InUse => "IN_USE",
        }
    }
}

impl FromStr for StationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(Self::Available),
            "IN_USE" => Ok(Self::InUse),
            other => Err(DomainError::invalid(
                "status",
                format!("unknown station status '{}'", other),
            )),
        }
    }
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five caller-supplied fields of a station.
///
/// Used for both creation and full replacement; partial updates do not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct StationDetails {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub charger_type: ChargerType,
    pub charging_points: i32,
    pub status: StationStatus,
}

impl StationDetails {
    /// Checks every field and reports all violations at once.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut violations = Vec::new();

        if self.address.trim().is_empty() {
            violations.push(FieldViolation::new("address", "must not be blank"));
        }
        if !LATITUDE_RANGE.contains(&self.latitude) {
            violations.push(FieldViolation::new(
                "latitude",
                "must be between -90 and 90",
            ));
        }
        if !LONGITUDE_RANGE.contains(&self.longitude) {
            violations.push(FieldViolation::new(
                "longitude",
                "must be between -180 and 180",
            ));
        }
        if !CHARGING_POINTS_RANGE.contains(&self.charging_points) {
            violations.push(FieldViolation::new(
                "chargingPoints",
                "must be between 1 and 20",
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(violations))
        }
    }
}

/// Persisted charging station
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Store-assigned identity, never reused
    pub id: i32,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub charger_type: ChargerType,
    pub charging_points: i32,
    pub status: StationStatus,
}

impl Station {
    pub fn from_details(id: i32, details: StationDetails) -> Self {
        Self {
            id,
            address: details.address,
            latitude: details.latitude,
            longitude: details.longitude,
            charger_type: details.charger_type,
            charging_points: details.charging_points,
            status: details.status,
        }
    }

    /// Overwrites every mutable field.
    pub fn apply(&mut self, details: StationDetails) {
        self.address = details.address;
        self.latitude = details.latitude;
        self.longitude = details.longitude;
        self.charger_type = details.charger_type;
        self.charging_points = details.charging_points;
        self.status = details.status;
    }
}

/// Case folding used by address search on every store.
pub fn fold_address(address: &str) -> String {
    address.to_lowercase()
}

/// Inclusive latitude/longitude bounding box. Not a geodesic radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationRange {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl LocationRange {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
            && (self.min_lon..=self.max_lon).contains(&longitude)
    }
}

/// Columns a station page can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationSortField {
    Id,
    Address,
    Latitude,
    Longitude,
    ChargerType,
    ChargingPoints,
    Status,
}

impl StationSortField {
    pub fn parse(field: &str) -> Result<Self, DomainError> {
        match field {
            "id" => Ok(Self::Id),
            "address" => Ok(Self::Address),
            "latitude" => Ok(Self::Latitude),
            "longitude" => Ok(Self::Longitude),
            "chargerType" => Ok(Self::ChargerType),
            "chargingPoints" => Ok(Self::ChargingPoints),
            "status" => Ok(Self::Status),
            other => Err(DomainError::invalid(
                "sort",
                format!("cannot sort stations by '{}'", other),
            )),
        }
    }

    /// Resolves an optional sort spec, defaulting to id ascending.
    pub fn resolve(sort: Option<&SortSpec>) -> Result<(Self, SortDirection), DomainError> {
        match sort {
            Some(spec) => Ok((Self::parse(&spec.field)?, spec.direction)),
            None => Ok((Self::Id, SortDirection::Asc)),
        }
    }

    /// Ordering used by stores without a query planner. Ties fall back to id.
    pub fn compare(&self, a: &Station, b: &Station) -> Ordering {
        let primary = match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Address => a.address.cmp(&b.address),
            Self::Latitude => a.latitude.total_cmp(&b.latitude),
            Self::Longitude => a.longitude.total_cmp(&b.longitude),
            Self::ChargerType => a.charger_type.as_str().cmp(b.charger_type.as_str()),
            Self::ChargingPoints => a.charging_points.cmp(&b.charging_points),
            Self::Status => a.status.as_str().cmp(b.status.as_str()),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Derived counts; never persisted, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationStatistics {
    pub total_stations: u64,
    pub available_stations: u64,
    pub in_use_stations: u64,
}

impl StationStatistics {
    pub fn new(total_stations: u64, available_stations: u64, in_use_stations: u64) -> Self {
        Self {
            total_stations,
            available_stations,
            in_use_stations,
        }
    }

    pub fn availability_percentage(&self) -> f64 {
        percentage(self.available_stations, self.total_stations)
    }

    pub fn usage_percentage(&self) -> f64 {
        percentage(self.in_use_stations, self.total_stations)
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}
