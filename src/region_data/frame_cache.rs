use crate::error::SolarstatError;
use crate::region_data::combiner::Combination;
use log::{debug, info};
use std::collections::btree_set;
use std::collections::{hash_map::Entry, BTreeSet, HashMap};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Order-independent set of region keys, used to key cached combinations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionSet(BTreeSet<String>);

impl RegionSet {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Keys in lexicographic order.
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl fmt::Display for RegionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.0.iter().map(String::as_str).collect();
        write!(f, "{{{}}}", keys.join(", "))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    combination: Combination,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

/// Time-bounded memo of combined frames, keyed by the requested [`RegionSet`].
///
/// Entries are written once and never modified; after `ttl` they are treated as
/// absent and replaced wholesale by the next insert. The lock is never held while a
/// combination is being built, so two racing callers may both build one; the first
/// insert wins and both observe the same entry.
#[derive(Debug)]
pub struct FrameCache {
    ttl: Duration,
    entries: Mutex<HashMap<RegionSet, CacheEntry>>,
}

impl FrameCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RegionSet, CacheEntry>> {
        // Entries are immutable once inserted, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached combination for `key`, if one exists and has not expired.
    pub fn get(&self, key: &RegionSet) -> Option<Combination> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(self.ttl) => Some(entry.combination.clone()),
            Some(_) => {
                debug!("Cache entry for {} expired", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `combination` under `key` unless a fresh entry already exists, and
    /// returns whichever entry is now cached. Expired entries of every key are
    /// evicted first.
    pub fn put(&self, key: RegionSet, combination: Combination) -> Combination {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(self.ttl));
        if entries.len() < before {
            debug!("Evicted {} expired cache entries", before - entries.len());
        }

        match entries.entry(key) {
            // Someone else inserted while we were building; keep theirs.
            Entry::Occupied(entry) => entry.get().combination.clone(),
            Entry::Vacant(entry) => {
                entry.insert(CacheEntry {
                    combination: combination.clone(),
                    inserted_at: Instant::now(),
                });
                combination
            }
        }
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn expire(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(self.ttl));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached combination for `key`, building and caching it with
    /// `build` on a miss. Failed builds are not cached.
    pub fn get_or_try_insert_with<F>(
        &self,
        key: &RegionSet,
        build: F,
    ) -> Result<Combination, SolarstatError>
    where
        F: FnOnce() -> Result<Combination, SolarstatError>,
    {
        // Fast path, lock released before building.
        if let Some(hit) = self.get(key) {
            info!("Cache hit for regions {}", key);
            return Ok(hit);
        }

        let built = build()?;
        info!("Caching combination for regions {}", key);
        Ok(self.put(key.clone(), built))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::region_frame;
    use std::cell::Cell;

    fn combination(region: &str, ghi: f64) -> Combination {
        Combination {
            frame: region_frame(region, &[Some(ghi)]),
            missing_regions: vec![],
            region_rows: vec![(region.to_string(), 1)],
        }
    }

    #[test]
    fn test_region_set_is_order_independent() {
        let a = RegionSet::new(["togo", "benin"]);
        let b = RegionSet::new(vec!["benin".to_string(), "togo".to_string(), "benin".to_string()]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.to_vec(), vec!["benin", "togo"]);
        assert_eq!(a.to_string(), "{benin, togo}");
    }

    #[test]
    fn test_get_put_round_trip() {
        let cache = FrameCache::new(Duration::from_secs(600));
        let key = RegionSet::new(["benin"]);
        assert!(cache.get(&key).is_none());

        cache.put(key.clone(), combination("benin", 1.0));

        assert_eq!(cache.get(&key), Some(combination("benin", 1.0)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_is_write_once_while_fresh() {
        let cache = FrameCache::new(Duration::from_secs(600));
        let key = RegionSet::new(["benin"]);

        cache.put(key.clone(), combination("benin", 1.0));
        let kept = cache.put(key.clone(), combination("benin", 2.0));

        assert_eq!(kept, combination("benin", 1.0));
        assert_eq!(cache.get(&key), Some(combination("benin", 1.0)));
    }

    #[test]
    fn test_expired_entries_are_absent_and_replaced() {
        let cache = FrameCache::new(Duration::ZERO);
        let key = RegionSet::new(["benin"]);

        cache.put(key.clone(), combination("benin", 1.0));
        assert!(cache.get(&key).is_none());

        let replaced = cache.put(key.clone(), combination("benin", 2.0));
        assert_eq!(replaced, combination("benin", 2.0));
        assert_eq!(cache.expire(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_evicts_expired_entries_of_other_keys() {
        let cache = FrameCache::new(Duration::from_millis(1));

        for region in ["a", "b", "c"] {
            cache.put(RegionSet::new([region]), combination(region, 1.0));
            std::thread::sleep(Duration::from_millis(20));
        }
        cache.put(RegionSet::new(["d"]), combination("d", 1.0));

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_or_try_insert_builds_once() -> Result<(), SolarstatError> {
        let cache = FrameCache::new(Duration::from_secs(600));
        let key = RegionSet::new(["togo"]);
        let builds = Cell::new(0);

        for _ in 0..3 {
            let combined = cache.get_or_try_insert_with(&key, || {
                builds.set(builds.get() + 1);
                Ok(combination("togo", 5.0))
            })?;
            assert_eq!(combined, combination("togo", 5.0));
        }

        assert_eq!(builds.get(), 1);
        Ok(())
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let cache = FrameCache::new(Duration::from_secs(600));
        let key = RegionSet::new(["niger"]);

        let result = cache.get_or_try_insert_with(&key, || {
            Err(SolarstatError::EmptySelection {
                requested: vec!["niger".into()],
            })
        });

        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = FrameCache::new(Duration::from_secs(600));
        cache.put(RegionSet::new(["a"]), combination("a", 1.0));
        cache.put(RegionSet::new(["b"]), combination("b", 1.0));
        cache.clear();
        assert!(cache.is_empty());
    }
}
