use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, Utc};

use crate::models::PricePoint;

/// Process-wide cache of upstream price-feed responses, keyed by the exact
/// `(area, start, end)` triple a caller asked for (spec.md §4.3 step 2,
/// §8 "identical calls cause exactly one upstream fetch").
///
/// Entries are immutable once inserted; only the map spine mutates, so a
/// single `Mutex` around the whole map is the mutual-exclusion discipline
/// spec.md §5 and §9 ask for.
#[derive(Default)]
pub struct PriceCache {
    entries: Mutex<HashMap<(String, DateTime<Utc>, DateTime<Utc>), Vec<PricePoint>>>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, area: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Vec<PricePoint>> {
        let key = (area.to_string(), start, end);
        self.entries.lock().unwrap().get(&key).cloned()
    }

    pub fn put(&self, area: &str, start: DateTime<Utc>, end: DateTime<Utc>, prices: Vec<PricePoint>) {
        let key = (area.to_string(), start, end);
        self.entries.lock().unwrap().insert(key, prices);
    }

    #[cfg(test)]
    pub fn reset(&self) {
        self.entries.lock().unwrap().clear();
    }
}

/// One saved warm anchor: the EV schedule and price series that produced a
/// successful `ok`-quality run (spec.md §3, §4.7 step 7).
#[derive(Clone)]
pub struct LastKnownGood {
    pub saved_at: DateTime<Local>,
    pub ev_schedule: Vec<f64>,
    pub price_series: Vec<f64>,
}

/// Process-wide last-known-good cache, keyed by property id. Entries older
/// than 24 hours are treated as absent (spec.md §3).
#[derive(Default)]
pub struct LastKnownGoodCache {
    entries: Mutex<HashMap<String, LastKnownGood>>,
}

const MAX_AGE: TimeDelta = TimeDelta::hours(24);

impl LastKnownGoodCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a new warm anchor for `property_id`, overwriting any prior entry.
    pub fn put(&self, property_id: &str, value: LastKnownGood) {
        self.entries.lock().unwrap().insert(property_id.to_string(), value);
    }

    /// Reads the warm anchor for `property_id`, evicting it (and returning
    /// `None`) if it is older than 24 hours.
    pub fn get(&self, property_id: &str) -> Option<LastKnownGood> {
        let mut guard = self.entries.lock().unwrap();
        match guard.get(property_id) {
            Some(entry) if Local::now() - entry.saved_at <= MAX_AGE => Some(entry.clone()),
            Some(_) => {
                guard.remove(property_id);
                None
            }
            None => None,
        }
    }

    #[cfg(test)]
    pub fn reset(&self) {
        self.entries.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn price_cache_hit() {
        let cache = PriceCache::new();
        let start = Utc::now();
        let end = start + Duration::hours(24);
        assert!(cache.get("SE3", start, end).is_none());
        cache.put("SE3", start, end, vec![]);
        assert!(cache.get("SE3", start, end).is_some());
    }

    #[test]
    fn last_known_good_evicts_stale_entries() {
        let cache = LastKnownGoodCache::new();
        cache.put(
            "prop-1",
            LastKnownGood {
                saved_at: Local::now() - Duration::hours(25),
                ev_schedule: vec![1.0],
                price_series: vec![2.0],
            },
        );
        assert!(cache.get("prop-1").is_none());
    }

    #[test]
    fn last_known_good_returns_fresh_entries() {
        let cache = LastKnownGoodCache::new();
        cache.put(
            "prop-1",
            LastKnownGood {
                saved_at: Local::now(),
                ev_schedule: vec![1.0],
                price_series: vec![2.0],
            },
        );
        assert!(cache.get("prop-1").is_some());
    }
}
