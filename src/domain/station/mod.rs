//! Charging station aggregate
//!
//! Contains the Station entity, its value objects, statistics and the
//! repository interface.

pub mod model;
pub mod repository;

pub use model::{
    fold_address, ChargerType, LocationRange, Station, StationDetails, StationSortField, StationStatistics,
    StationStatus, CHARGING_POINTS_RANGE, LATITUDE_RANGE, LONGITUDE_RANGE,
};
pub use repository::StationRepository;
