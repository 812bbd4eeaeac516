//! Station service - application-layer orchestration
//!
//! Enforces validation, address uniqueness and existence rules on top of the
//! repository, and keeps the available-stations cache coherent with writes.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cache::AvailableStationsCache;
use crate::domain::{
    ChargerType, DomainError, DomainResult, LocationRange, Station, StationDetails,
    StationRepository, StationStatistics, StationStatus,
};
use crate::shared::{PageRequest, PaginatedResult};

pub struct StationService {
    repo: Arc<dyn StationRepository>,
    available_cache: Arc<AvailableStationsCache>,
}

impl StationService {
    pub fn new(repo: Arc<dyn StationRepository>, available_cache: Arc<AvailableStationsCache>) -> Self {
        Self {
            repo,
            available_cache,
        }
    }

    // ── Reads ───────────────────────────────────────────────────

    pub async fn get_all_stations(&self) -> DomainResult<Vec<Station>> {
        debug!("Fetching all stations");
        self.repo.find_all().await
    }

    pub async fn get_all_stations_paged(
        &self,
        request: &PageRequest,
    ) -> DomainResult<PaginatedResult<Station>> {
        debug!(page = request.page, limit = request.limit, "Fetching station page");
        self.repo.find_page(request).await
    }

    pub async fn get_station_by_id(&self, id: i32) -> DomainResult<Option<Station>> {
        debug!(station_id = id, "Fetching station");
        self.repo.find_by_id(id).await
    }

    pub async fn get_stations_by_charger_type(
        &self,
        charger_type: ChargerType,
    ) -> DomainResult<Vec<Station>> {
        debug!(%charger_type, "Fetching stations by charger type");
        self.repo.find_by_charger_type(charger_type).await
    }

    pub async fn get_stations_by_status(&self, status: StationStatus) -> DomainResult<Vec<Station>> {
        debug!(%status, "Fetching stations by status");
        self.repo.find_by_status(status).await
    }

    /// Served from the `availableStations` region when populated.
    pub async fn get_available_stations(&self) -> DomainResult<Arc<Vec<Station>>> {
        if let Some(cached) = self.available_cache.get() {
            debug!(count = cached.len(), "Available stations served from cache");
            return Ok(cached);
        }

        let stations = self.repo.find_by_status(StationStatus::Available).await?;
        debug!(count = stations.len(), "Available stations loaded from store");
        Ok(self.available_cache.put(stations))
    }

    pub async fn get_in_use_stations(&self) -> DomainResult<Vec<Station>> {
        self.repo.find_by_status(StationStatus::InUse).await
    }

    pub async fn find_stations_by_location_range(
        &self,
        range: LocationRange,
    ) -> DomainResult<Vec<Station>> {
        debug!(?range, "Fetching stations in bounding box");
        self.repo.find_by_location_within_range(range).await
    }

    pub async fn search_stations_by_address(&self, needle: &str) -> DomainResult<Vec<Station>> {
        debug!(needle, "Searching stations by address");
        self.repo.find_by_address_containing_ignore_case(needle).await
    }

    pub async fn get_stations_with_min_charging_points(
        &self,
        min_points: i32,
    ) -> DomainResult<Vec<Station>> {
        self.repo.find_by_charging_points_at_least(min_points).await
    }

    /// Three independent counts; not a consistent snapshot under concurrent writes.
    pub async fn get_statistics(&self) -> DomainResult<StationStatistics> {
        let total = self.repo.count().await?;
        let available = self.repo.count_by_status(StationStatus::Available).await?;
        let in_use = self.repo.count_by_status(StationStatus::InUse).await?;
        Ok(StationStatistics::new(total, available, in_use))
    }

    // ── Writes ──────────────────────────────────────────────────

    pub async fn create_station(&self, details: StationDetails) -> DomainResult<Station> {
        details.validate()?;

        if self.repo.exists_by_address(&details.address).await? {
            warn!(address = %details.address, "Rejected duplicate station address");
            return Err(DomainError::DuplicateAddress(details.address));
        }

        let station = self.repo.insert(details).await?;
        self.available_cache.clear();

        info!(station_id = station.id, address = %station.address, "Station created");
        Ok(station)
    }

    pub async fn update_station(&self, id: i32, details: StationDetails) -> DomainResult<Station> {
        details.validate()?;

        let mut station = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::station_not_found(id))?;

        if station.address != details.address && self.repo.exists_by_address(&details.address).await? {
            warn!(station_id = id, address = %details.address, "Rejected duplicate station address");
            return Err(DomainError::DuplicateAddress(details.address));
        }

        station.apply(details);
        let updated = self.repo.update(station).await?;
        self.available_cache.clear();

        info!(station_id = id, "Station updated");
        Ok(updated)
    }

    pub async fn delete_station(&self, id: i32) -> DomainResult<()> {
        if !self.repo.exists_by_id(id).await? {
            return Err(DomainError::station_not_found(id));
        }

        self.repo.delete_by_id(id).await?;
        self.available_cache.clear();

        info!(station_id = id, "Station deleted");
        Ok(())
    }

    /// Any transition is allowed, including to the current status.
    pub async fn change_station_status(
        &self,
        id: i32,
        status: StationStatus,
    ) -> DomainResult<Station> {
        let mut station = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::station_not_found(id))?;

        let previous = station.status;
        station.status = status;
        let updated = self.repo.update(station).await?;
        self.available_cache.clear();

        info!(station_id = id, from = %previous, to = %status, "Station status changed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryStationRepository;

    fn service() -> (StationService, Arc<AvailableStationsCache>) {
        let cache = Arc::new(AvailableStationsCache::default());
        let repo = Arc::new(InMemoryStationRepository::new());
        (StationService::new(repo, cache.clone()), cache)
    }

    fn details(address: &str) -> StationDetails {
        StationDetails {
            address: address.to_string(),
            latitude: 40.0,
            longitude: -74.0,
            charger_type: ChargerType::Ac,
            charging_points: 4,
            status: StationStatus::Available,
        }
    }

    #[tokio::test]
    async fn main_street_scenario() {
        let (service, _) = service();

        let a = service.create_station(details("Main St 1")).await.unwrap();
        assert_eq!(a.id, 1);

        let mut b = details("Main St 1");
        b.latitude = 41.0;
        b.charger_type = ChargerType::DcFast;
        let err = service.create_station(b).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateAddress(_)));
        assert_eq!(service.get_all_stations().await.unwrap().len(), 1);

        let changed = service
            .change_station_status(1, StationStatus::InUse)
            .await
            .unwrap();
        assert_eq!(changed.status, StationStatus::InUse);
        assert!(service.get_available_stations().await.unwrap().is_empty());

        let stats = service.get_statistics().await.unwrap();
        assert_eq!(stats, StationStatistics::new(1, 0, 1));
    }

    #[tokio::test]
    async fn available_cache_is_coherent_with_creates() {
        let (service, cache) = service();

        service.create_station(details("A")).await.unwrap();
        assert_eq!(service.get_available_stations().await.unwrap().len(), 1);
        assert!(cache.is_populated());

        service.create_station(details("B")).await.unwrap();
        assert!(!cache.is_populated());
        let available = service.get_available_stations().await.unwrap();
        let addresses: Vec<_> = available.iter().map(|s| s.address.as_str()).collect();
        assert_eq!(addresses, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn cache_hit_does_not_reload() {
        let (service, _) = service();
        service.create_station(details("A")).await.unwrap();
        let first = service.get_available_stations().await.unwrap();
        let second = service.get_available_stations().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn every_write_clears_the_cache() {
        let (service, cache) = service();
        let a = service.create_station(details("A")).await.unwrap();

        service.get_available_stations().await.unwrap();
        service.update_station(a.id, details("A2")).await.unwrap();
        assert!(!cache.is_populated());

        service.get_available_stations().await.unwrap();
        service
            .change_station_status(a.id, StationStatus::Available)
            .await
            .unwrap();
        assert!(!cache.is_populated());

        service.get_available_stations().await.unwrap();
        service.delete_station(a.id).await.unwrap();
        assert!(!cache.is_populated());
        assert!(service.get_available_stations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_station_fails_without_touching_cache() {
        let (service, cache) = service();
        service.create_station(details("A")).await.unwrap();
        service.get_available_stations().await.unwrap();

        assert!(matches!(
            service.update_station(99, details("Z")).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(matches!(
            service.delete_station(99).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(matches!(
            service
                .change_station_status(99, StationStatus::InUse)
                .await
                .unwrap_err(),
            DomainError::NotFound { .. }
        ));

        assert!(cache.is_populated());
        assert_eq!(service.get_all_stations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_to_taken_address_is_rejected() {
        let (service, _) = service();
        service.create_station(details("A")).await.unwrap();
        let b = service.create_station(details("B")).await.unwrap();

        assert!(matches!(
            service.update_station(b.id, details("A")).await.unwrap_err(),
            DomainError::DuplicateAddress(_)
        ));
        let stored = service.get_station_by_id(b.id).await.unwrap().unwrap();
        assert_eq!(stored.address, "B");

        // keeping the same address is not a conflict
        let mut same = details("B");
        same.charging_points = 8;
        let updated = service.update_station(b.id, same).await.unwrap();
        assert_eq!(updated.charging_points, 8);
    }

    #[tokio::test]
    async fn invalid_details_are_rejected_before_the_store() {
        let (service, _) = service();
        let mut bad = details("A");
        bad.charging_points = 21;
        assert!(matches!(
            service.create_station(bad).await.unwrap_err(),
            DomainError::Validation(_)
        ));
        assert_eq!(service.get_statistics().await.unwrap().total_stations, 0);
    }

    #[tokio::test]
    async fn statistics_identity_holds() {
        let (service, _) = service();
        for (i, address) in ["A", "B", "C"].iter().enumerate() {
            let mut d = details(address);
            if i == 0 {
                d.status = StationStatus::InUse;
            }
            service.create_station(d).await.unwrap();
        }
        let stats = service.get_statistics().await.unwrap();
        assert_eq!(
            stats.total_stations,
            stats.available_stations + stats.in_use_stations
        );
        assert_eq!(stats.in_use_stations, 1);
    }

    #[tokio::test]
    async fn get_by_id_of_missing_station_is_empty() {
        let (service, _) = service();
        assert!(service.get_station_by_id(42).await.unwrap().is_none());
    }
}
