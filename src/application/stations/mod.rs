//! Station registry use-cases and the available-stations cache

pub mod cache;
pub mod service;

pub use cache::{AvailableStationsCache, CacheRegion, AVAILABLE_STATIONS};
pub use service::StationService;
