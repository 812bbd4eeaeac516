//! In-memory repositories
//!
//! Used with `database.url = "memory"` and throughout the service tests.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::station::{fold_address, StationSortField};
use crate::domain::{
    ChargerType, DomainError, DomainResult, LocationRange, NewUser, Station, StationDetails,
    StationRepository, StationStatus, User, UserRepository,
};
use crate::shared::{PageRequest, PaginatedResult, SortDirection};

/// In-memory station store for development and testing
pub struct InMemoryStationRepository {
    stations: DashMap<i32, Station>,
    /// address -> owning station id; backs the unique-address rule
    addresses: DashMap<String, i32>,
    id_counter: AtomicI32,
}

impl InMemoryStationRepository {
    pub fn new() -> Self {
        Self {
            stations: DashMap::new(),
            addresses: DashMap::new(),
            id_counter: AtomicI32::new(1),
        }
    }

    fn filtered(&self, predicate: impl Fn(&Station) -> bool) -> Vec<Station> {
        let mut items: Vec<Station> = self
            .stations
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by_key(|s| s.id);
        items
    }

    fn claim_address(&self, address: &str, id: i32) -> DomainResult<()> {
        match self.addresses.entry(address.to_string()) {
            Entry::Occupied(entry) if *entry.get() != id => {
                Err(DomainError::DuplicateAddress(address.to_string()))
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                entry.insert(id);
                Ok(())
            }
        }
    }

    fn release_address(&self, address: &str, id: i32) {
        self.addresses.remove_if(address, |_, owner| *owner == id);
    }
}

impl Default for InMemoryStationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StationRepository for InMemoryStationRepository {
    async fn find_all(&self) -> DomainResult<Vec<Station>> {
        Ok(self.filtered(|_| true))
    }

    async fn find_page(&self, request: &PageRequest) -> DomainResult<PaginatedResult<Station>> {
        let (field, direction) = StationSortField::resolve(request.sort.as_ref())?;

        let mut items: Vec<Station> = self.stations.iter().map(|e| e.value().clone()).collect();
        items.sort_by(|a, b| match direction {
            SortDirection::Asc => field.compare(a, b),
            SortDirection::Desc => field.compare(b, a),
        });

        let total = items.len() as u64;
        let page_items = items
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit as usize)
            .collect();

        Ok(PaginatedResult::new(page_items, total, request.page, request.limit))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Station>> {
        Ok(self.stations.get(&id).map(|s| s.clone()))
    }

    async fn insert(&self, details: StationDetails) -> DomainResult<Station> {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        self.claim_address(&details.address, id)?;

        let station = Station::from_details(id, details);
        self.stations.insert(id, station.clone());
        Ok(station)
    }

    async fn update(&self, station: Station) -> DomainResult<Station> {
        let previous_address = self
            .stations
            .get(&station.id)
            .map(|s| s.address.clone())
            .ok_or_else(|| DomainError::station_not_found(station.id))?;

        self.claim_address(&station.address, station.id)?;

        match self.stations.get_mut(&station.id) {
            Some(mut current) => *current = station.clone(),
            None => {
                self.release_address(&station.address, station.id);
                return Err(DomainError::station_not_found(station.id));
            }
        }

        if previous_address != station.address {
            self.release_address(&previous_address, station.id);
        }
        Ok(station)
    }

    async fn delete_by_id(&self, id: i32) -> DomainResult<()> {
        let (_, removed) = self
            .stations
            .remove(&id)
            .ok_or_else(|| DomainError::station_not_found(id))?;
        self.release_address(&removed.address, id);
        Ok(())
    }

    async fn exists_by_address(&self, address: &str) -> DomainResult<bool> {
        Ok(self.addresses.contains_key(address))
    }

    async fn exists_by_id(&self, id: i32) -> DomainResult<bool> {
        Ok(self.stations.contains_key(&id))
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.stations.len() as u64)
    }

    async fn count_by_status(&self, status: StationStatus) -> DomainResult<u64> {
        Ok(self
            .stations
            .iter()
            .filter(|e| e.value().status == status)
            .count() as u64)
    }

    async fn find_by_charger_type(&self, charger_type: ChargerType) -> DomainResult<Vec<Station>> {
        Ok(self.filtered(|s| s.charger_type == charger_type))
    }

    async fn find_by_status(&self, status: StationStatus) -> DomainResult<Vec<Station>> {
        Ok(self.filtered(|s| s.status == status))
    }

    async fn find_by_charging_points_at_least(
        &self,
        min_points: i32,
    ) -> DomainResult<Vec<Station>> {
        Ok(self.filtered(|s| s.charging_points >= min_points))
    }

    async fn find_by_address_containing_ignore_case(
        &self,
        needle: &str,
    ) -> DomainResult<Vec<Station>> {
        let needle = fold_address(needle);
        Ok(self.filtered(|s| fold_address(&s.address).contains(&needle)))
    }

    async fn find_by_location_within_range(
        &self,
        range: LocationRange,
    ) -> DomainResult<Vec<Station>> {
        Ok(self.filtered(|s| range.contains(s.latitude, s.longitude)))
    }
}

/// In-memory account store keyed by email
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(email).map(|u| u.clone()))
    }

    async fn exists_by_email(&self, email: &str) -> DomainResult<bool> {
        Ok(self.users.contains_key(email))
    }

    async fn insert(&self, new_user: NewUser) -> DomainResult<User> {
        match self.users.entry(new_user.email.clone()) {
            Entry::Occupied(_) => Err(DomainError::DuplicateEmail(new_user.email)),
            Entry::Vacant(entry) => {
                let user = User {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: new_user.name,
                    email: new_user.email,
                    password_hash: new_user.password_hash,
                    role: new_user.role,
                    created_at: Utc::now(),
                };
                entry.insert(user.clone());
                Ok(user)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::shared::SortSpec;

    fn details(address: &str) -> StationDetails {
        StationDetails {
            address: address.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            charger_type: ChargerType::Ac,
            charging_points: 2,
            status: StationStatus::Available,
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_are_not_reused() {
        let repo = InMemoryStationRepository::new();
        let a = repo.insert(details("A")).await.unwrap();
        assert_eq!(a.id, 1);
        repo.delete_by_id(a.id).await.unwrap();
        let b = repo.insert(details("B")).await.unwrap();
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn address_is_unique_and_released_on_change() {
        let repo = InMemoryStationRepository::new();
        let mut a = repo.insert(details("A")).await.unwrap();
        assert!(matches!(
            repo.insert(details("A")).await.unwrap_err(),
            DomainError::DuplicateAddress(_)
        ));

        a.address = "A2".into();
        repo.update(a).await.unwrap();
        assert!(!repo.exists_by_address("A").await.unwrap());
        assert!(repo.insert(details("A")).await.is_ok());
    }

    #[tokio::test]
    async fn update_cannot_take_another_stations_address() {
        let repo = InMemoryStationRepository::new();
        repo.insert(details("A")).await.unwrap();
        let mut b = repo.insert(details("B")).await.unwrap();
        b.address = "A".into();
        assert!(matches!(
            repo.update(b.clone()).await.unwrap_err(),
            DomainError::DuplicateAddress(_)
        ));
        assert_eq!(repo.find_by_id(b.id).await.unwrap().unwrap().address, "B");
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_station_fail() {
        let repo = InMemoryStationRepository::new();
        let ghost = Station::from_details(5, details("Ghost"));
        assert!(matches!(
            repo.update(ghost).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(!repo.exists_by_address("Ghost").await.unwrap());
        assert!(matches!(
            repo.delete_by_id(5).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn page_sorted_descending() {
        let repo = InMemoryStationRepository::new();
        for address in ["B", "C", "A"] {
            repo.insert(details(address)).await.unwrap();
        }
        let request = PageRequest::new(Some(1), Some(2), Some(SortSpec::parse("address,desc").unwrap()));
        let page = repo.find_page(&request).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|s| s.address.as_str()).collect();
        assert_eq!(names, vec!["C", "B"]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn search_ignores_case() {
        let repo = InMemoryStationRepository::new();
        repo.insert(details("Main Street")).await.unwrap();
        repo.insert(details("Harbour")).await.unwrap();
        let hits = repo.find_by_address_containing_ignore_case("mAiN").await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_user_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        let user = NewUser {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "hash".into(),
            role: UserRole::User,
        };
        repo.insert(user.clone()).await.unwrap();
        assert!(matches!(
            repo.insert(user).await.unwrap_err(),
            DomainError::DuplicateEmail(_)
        ));
    }
}
