//! Database repository implementations

pub mod station_repository;
pub mod user_repository;

pub use station_repository::SeaOrmStationRepository;
pub use user_repository::SeaOrmUserRepository;
