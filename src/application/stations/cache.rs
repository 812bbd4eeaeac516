//! Named single-value cache regions

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::debug;

use crate::domain::Station;

/// Region holding the result of `get_available_stations`.
pub const AVAILABLE_STATIONS: &str = "availableStations";

pub type AvailableStationsCache = CacheRegion<Vec<Station>>;

/// A region holds at most one value and is emptied on every write to the
/// underlying store. There is no TTL and no size bound.
pub struct CacheRegion<T> {
    name: &'static str,
    slot: ArcSwapOption<T>,
}

impl<T> CacheRegion<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: ArcSwapOption::empty(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self) -> Option<Arc<T>> {
        let cached = self.slot.load_full();
        if cached.is_some() {
            metrics::counter!("station_cache_hits_total", "region" => self.name).increment(1);
        } else {
            metrics::counter!("station_cache_misses_total", "region" => self.name).increment(1);
        }
        cached
    }

    pub fn put(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.slot.store(Some(Arc::clone(&value)));
        value
    }

    pub fn clear(&self) {
        if self.slot.swap(None).is_some() {
            debug!(region = self.name, "Cache region cleared");
        }
    }

    pub fn is_populated(&self) -> bool {
        self.slot.load().is_some()
    }
}

impl AvailableStationsCache {
    pub fn available_stations() -> Self {
        Self::new(AVAILABLE_STATIONS)
    }
}

impl Default for AvailableStationsCache {
    fn default() -> Self {
        Self::available_stations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_region_misses() {
        let region: CacheRegion<u32> = CacheRegion::new("test");
        assert!(region.get().is_none());
        assert!(!region.is_populated());
    }

    #[test]
    fn put_then_get_returns_same_value() {
        let region = CacheRegion::new("test");
        let stored = region.put(vec![1, 2, 3]);
        let hit = region.get().unwrap();
        assert!(Arc::ptr_eq(&stored, &hit));
    }

    #[test]
    fn clear_empties_the_region() {
        let region = CacheRegion::new("test");
        region.put("value");
        region.clear();
        assert!(region.get().is_none());
        // clearing twice is harmless
        region.clear();
    }

    #[test]
    fn available_stations_region_name() {
        assert_eq!(AvailableStationsCache::default().name(), "availableStations");
    }
}
