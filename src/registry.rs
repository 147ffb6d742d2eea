use crate::clock::Clock;
use crate::codec;
use crate::errors::RegistryError;
use crate::models::{CounterId, CounterPatch, CounterRecord};
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Issues millisecond-timestamp ids that never repeat, even when asked twice
/// within the same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_issued: i64,
}

impl IdGenerator {
    pub fn next(&mut self, now: DateTime<Utc>, taken: impl Fn(&CounterId) -> bool) -> CounterId {
        let mut candidate = now.timestamp_millis().max(self.last_issued + 1);
        while taken(&CounterId::new(candidate.to_string())) {
            candidate += 1;
        }
        self.last_issued = candidate;
        CounterId::new(candidate.to_string())
    }
}

/// Authoritative in-memory set of live counters, written through to the store
/// on every mutation that leaves a counter with a valid date.
pub struct CounterRegistry<S> {
    store: S,
    clock: Arc<dyn Clock>,
    records: BTreeMap<CounterId, CounterRecord>,
    ids: IdGenerator,
}

impl<S: KeyValueStore> CounterRegistry<S> {
    /// Empty registry over `store`; nothing is read until [`reload`](Self::reload).
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            records: BTreeMap::new(),
            ids: IdGenerator::default(),
        }
    }

    pub fn load(store: S, clock: Arc<dyn Clock>) -> Self {
        let mut registry = Self::new(store, clock);
        registry.reload();
        registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &CounterId) -> Option<&CounterRecord> {
        self.records.get(id)
    }

    /// Snapshot of every live counter, ordered by id.
    pub fn list(&self) -> Vec<CounterRecord> {
        self.records.values().cloned().collect()
    }

    /// Adds a counter. It is persisted right away only if `date` is valid.
    ///
    /// On a store failure the counter stays live in memory and the error is
    /// returned.
    pub fn create(
        &mut self,
        title: Option<String>,
        date: Option<DateTime<Utc>>,
    ) -> Result<CounterId, RegistryError> {
        let records = &self.records;
        let stored = codec::list_ids(&self.store);
        let id = self.ids.next(self.clock.now(), |id| {
            records.contains_key(id) || stored.contains(id)
        });
        let record = CounterRecord::new(id.clone(), title.unwrap_or_default(), date);

        let persisted = codec::write(&record, &mut self.store);
        self.records.insert(id.clone(), record);
        match persisted {
            Ok(persisted) => {
                info!(id = %id, persisted, "counter created");
                Ok(id)
            }
            Err(err) => {
                error!(id = %id, "failed to persist new counter: {err}");
                Err(err.into())
            }
        }
    }

    /// Merges `patch` into the counter. A valid resulting date is written
    /// through; an invalid one clears the display and leaves whatever was
    /// persisted before untouched.
    pub fn update(&mut self, id: &CounterId, patch: CounterPatch) -> Result<CounterRecord, RegistryError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        record.apply(patch);
        let snapshot = record.clone();

        match codec::write(&snapshot, &mut self.store) {
            Ok(true) => debug!(id = %id, "counter updated"),
            Ok(false) => warn!(id = %id, "counter has no valid date, keeping last stored state"),
            Err(err) => {
                error!(id = %id, "failed to persist counter: {err}");
                return Err(err.into());
            }
        }
        Ok(snapshot)
    }

    /// Evicts the counter and purges every stored key for it. A second call
    /// for the same id fails with `NotFound`.
    pub fn remove(&mut self, id: &CounterId) -> Result<CounterRecord, RegistryError> {
        let record = self
            .records
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;

        if let Err(err) = codec::remove(id, &mut self.store) {
            error!(id = %id, "failed to purge stored counter: {err}");
            return Err(err.into());
        }
        info!(id = %id, "counter removed");
        Ok(record)
    }

    /// Replaces the in-memory set with whatever decodes from the store. Ids
    /// that fail to decode are skipped. Returns the number of live counters.
    pub fn reload(&mut self) -> usize {
        self.records.clear();

        let ids = codec::list_ids(&self.store);
        let listed = ids.len();
        for id in ids {
            match codec::decode(&id, &self.store) {
                Some(record) => {
                    self.records.insert(id, record);
                }
                None => warn!(id = %id, "skipping counter that failed to decode"),
            }
        }

        info!(loaded = self.records.len(), skipped = listed - self.records.len(), "counters reloaded");
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn registry() -> CounterRegistry<MemoryStore> {
        CounterRegistry::new(MemoryStore::new(), Arc::new(ManualClock::new(start())))
    }

    #[test]
    fn create_within_same_millisecond_yields_distinct_ids() {
        let mut registry = registry();
        let a = registry.create(None, None).unwrap();
        let b = registry.create(None, None).unwrap();
        let c = registry.create(None, None).unwrap();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(a.as_str(), start().timestamp_millis().to_string());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn ids_skip_counters_loaded_from_store() {
        let mut store = MemoryStore::new();
        let taken = CounterId::new(start().timestamp_millis().to_string());
        codec::write(&CounterRecord::new(taken.clone(), "loaded", Some(start())), &mut store).unwrap();

        let mut registry = CounterRegistry::load(store, Arc::new(ManualClock::new(start())));
        let fresh = registry.create(None, None).unwrap();
        assert_ne!(fresh, taken);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn create_without_date_is_not_persisted() {
        let mut registry = registry();
        let id = registry.create(Some("coffee".into()), None).unwrap();

        assert!(registry.store().is_empty());
        let record = registry.get(&id).unwrap();
        assert_eq!(record.title(), "coffee");
        assert_eq!(record.formatted_date(), None);
    }

    #[test]
    fn create_with_date_writes_through() {
        let mut registry = registry();
        let id = registry.create(Some("coffee".into()), Some(start())).unwrap();

        assert_eq!(registry.store().len(), 4);
        assert_eq!(codec::decode(&id, registry.store()).as_ref(), registry.get(&id));
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut registry = registry();
        let err = registry
            .update(&CounterId::new("nope"), CounterPatch::default().title("x"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[test]
    fn update_with_invalid_date_keeps_last_good_blob() {
        let mut registry = registry();
        let id = registry.create(Some("coffee".into()), Some(start())).unwrap();
        let blob_before = registry.store().get(&codec::blob_key(&id));

        let record = registry
            .update(&id, CounterPatch::default().title("tea").target_instant(None))
            .unwrap();

        assert_eq!(record.title(), "tea");
        assert_eq!(record.target_instant(), None);
        assert_eq!(record.formatted_date(), None);
        assert_eq!(registry.store().get(&codec::blob_key(&id)), blob_before);
        assert_eq!(
            registry.store().get(&codec::title_key(&id)).as_deref(),
            Some("coffee")
        );
    }

    #[test]
    fn update_with_valid_date_rederives_display() {
        let mut registry = registry();
        let id = registry.create(Some("coffee".into()), None).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap();

        let record = registry
            .update(&id, CounterPatch::default().target_instant(Some(later)))
            .unwrap();
        assert_eq!(record.formatted_date(), Some("3/4/2024, 3:00:00 PM"));
        assert_eq!(
            registry.store().get(&codec::formatted_key(&id)).as_deref(),
            Some("3/4/2024, 3:00:00 PM")
        );
    }

    #[test]
    fn remove_purges_store_and_second_remove_fails() {
        let mut registry = registry();
        let id = registry.create(Some("coffee".into()), Some(start())).unwrap();

        registry.remove(&id).unwrap();
        assert!(registry.get(&id).is_none());
        assert!(registry.store().is_empty());
        assert!(codec::decode(&id, registry.store()).is_none());

        let err = registry.remove(&id).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
        let err = registry.update(&id, CounterPatch::default()).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[test]
    fn reload_is_idempotent_and_skips_corrupt_ids() {
        let mut registry = registry();
        let a = registry.create(Some("coffee".into()), Some(start())).unwrap();
        let b = registry.create(Some("sugar".into()), Some(start())).unwrap();
        let before = registry.list();

        let mut store = registry.into_store();
        store.set("block_C", "{{{").unwrap();
        store.set(&codec::blob_key(&b), "{\"title\":").unwrap();

        let mut registry = CounterRegistry::load(store, Arc::new(ManualClock::new(start())));
        assert_eq!(registry.list(), before);
        assert!(registry.get(&a).is_some());
        assert!(registry.get(&CounterId::new("C")).is_none());

        assert_eq!(registry.reload(), 2);
        assert_eq!(registry.list(), before);
    }

    #[test]
    fn reload_ignores_counters_with_only_shadow_keys() {
        let mut registry = registry();
        let a = registry.create(Some("coffee".into()), Some(start())).unwrap();
        let b = registry.create(Some("sugar".into()), Some(start())).unwrap();

        let mut store = registry.into_store();
        store.remove(&codec::blob_key(&b)).unwrap();

        let registry = CounterRegistry::load(store, Arc::new(ManualClock::new(start())));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&a).is_some());
        assert!(registry.get(&b).is_none());
        assert!(codec::decode(&b, registry.store()).is_some());
    }

    #[test]
    fn ids_skip_undecodable_stored_counters() {
        let mut store = MemoryStore::new();
        let stored = CounterId::new(start().timestamp_millis().to_string());
        store.set(&codec::blob_key(&stored), "not json").unwrap();

        let mut registry = CounterRegistry::load(store, Arc::new(ManualClock::new(start())));
        assert!(registry.is_empty());

        let fresh = registry.create(Some("tea".into()), Some(start())).unwrap();
        assert_ne!(fresh, stored);
        assert_eq!(
            registry.store().get(&codec::blob_key(&stored)).as_deref(),
            Some("not json")
        );
    }

    #[test]
    fn reload_drops_unsaved_counters() {
        let mut registry = registry();
        registry.create(Some("draft".into()), None).unwrap();
        assert_eq!(registry.reload(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn list_is_a_snapshot() {
        let mut registry = registry();
        let id = registry.create(Some("coffee".into()), Some(start())).unwrap();
        let snapshot = registry.list();

        registry.remove(&id).unwrap();
        registry.create(Some("tea".into()), None).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title(), "coffee");
    }
}
