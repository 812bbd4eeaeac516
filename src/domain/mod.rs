//! Domain layer: entities, value objects and repository contracts.

pub mod station;
pub mod user;

pub use station::{
    ChargerType, LocationRange, Station, StationDetails, StationRepository, StationStatistics,
    StationStatus,
};
pub use user::{NewUser, User, UserRepository, UserRole};

pub use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
