//! Station repository interface

use async_trait::async_trait;

use super::model::{ChargerType, LocationRange, Station, StationDetails, StationStatus};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

/// Persistence contract for stations.
///
/// Listing methods return stations ordered by id ascending. Each call is
/// atomic on its own; callers get no isolation across calls.
#[async_trait]
pub trait StationRepository: Send + Sync {
    async fn find_all(&self) -> DomainResult<Vec<Station>>;
    async fn find_page(&self, request: &PageRequest) -> DomainResult<PaginatedResult<Station>>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Station>>;

    /// Persists a new station; the store assigns the id.
    async fn insert(&self, details: StationDetails) -> DomainResult<Station>;
    /// Replaces every mutable field of an existing station.
    async fn update(&self, station: Station) -> DomainResult<Station>;
    async fn delete_by_id(&self, id: i32) -> DomainResult<()>;

    async fn exists_by_address(&self, address: &str) -> DomainResult<bool>;
    async fn exists_by_id(&self, id: i32) -> DomainResult<bool>;
    async fn count(&self) -> DomainResult<u64>;
    async fn count_by_status(&self, status: StationStatus) -> DomainResult<u64>;

    async fn find_by_charger_type(&self, charger_type: ChargerType) -> DomainResult<Vec<Station>>;
    async fn find_by_status(&self, status: StationStatus) -> DomainResult<Vec<Station>>;
    async fn find_by_charging_points_at_least(&self, min_points: i32)
        -> DomainResult<Vec<Station>>;
    async fn find_by_address_containing_ignore_case(
        &self,
        needle: &str,
    ) -> DomainResult<Vec<Station>>;
    async fn find_by_location_within_range(
        &self,
        range: LocationRange,
    ) -> DomainResult<Vec<Station>>;
}
