use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::adapters::counter_store::{CounterStore, StoreError};
use crate::runtime::record::{StampKey, StampRecord, UpdateSpec};

/// A store call as observed by [`InMemoryCounterStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    Get(StampKey),
    Put(StampRecord),
    Update(StampKey, UpdateSpec),
}

/// Process-local counter table with the same item semantics as the DynamoDB
/// adapter. Used by `local_invoke --in-memory` and by tests.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    records: Mutex<BTreeMap<StampKey, i64>>,
    journal: Mutex<Vec<StoreOperation>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = StampRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.seed(record);
        }
        store
    }

    /// Inserts a record without journaling it.
    pub fn seed(&self, record: StampRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.key, record.stamps);
    }

    pub fn stamps(&self, key: &StampKey) -> Option<i64> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn operations(&self) -> Vec<StoreOperation> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, operation: StoreOperation) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(operation);
    }
}

impl CounterStore for InMemoryCounterStore {
    fn get_item(&self, key: &StampKey) -> Result<Option<StampRecord>, StoreError> {
        self.record(StoreOperation::Get(key.clone()));
        Ok(self
            .stamps(key)
            .map(|stamps| StampRecord::new(key.clone(), stamps)))
    }

    fn put_item(&self, record: &StampRecord) -> Result<(), StoreError> {
        self.record(StoreOperation::Put(record.clone()));
        self.seed(record.clone());
        Ok(())
    }

    fn update_item(&self, key: &StampKey, update: UpdateSpec) -> Result<StampRecord, StoreError> {
        self.record(StoreOperation::Update(key.clone(), update));
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        // An additive expression needs an existing attribute; a set upserts.
        let stamps = match (records.get(key).copied(), update) {
            (Some(current), _) => update.apply(current).ok_or_else(|| StoreError::Rejected {
                operation: "UpdateItem",
                message: format!("Stamps for {key} would overflow"),
            })?,
            (None, UpdateSpec::Set(value)) => value,
            (None, UpdateSpec::Add(_)) => {
                return Err(StoreError::Rejected {
                    operation: "UpdateItem",
                    message: format!("no Stamps attribute to add to for {key}"),
                });
            }
        };
        records.insert(key.clone(), stamps);
        Ok(StampRecord::new(key.clone(), stamps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_update_requires_existing_record() {
        let store = InMemoryCounterStore::new();
        let key = StampKey::new("S1", "C1");

        let error = store
            .update_item(&key, UpdateSpec::Add(1))
            .expect_err("missing attribute should be rejected");
        assert!(matches!(error, StoreError::Rejected { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn set_update_upserts_and_journals() {
        let store = InMemoryCounterStore::new();
        let key = StampKey::new("S1", "C1");

        let record = store
            .update_item(&key, UpdateSpec::Set(4))
            .expect("set should succeed");
        assert_eq!(record.stamps, 4);
        assert_eq!(store.stamps(&key), Some(4));
        assert_eq!(
            store.operations(),
            vec![StoreOperation::Update(key, UpdateSpec::Set(4))]
        );
    }

    #[test]
    fn seeded_records_are_not_journaled() {
        let key = StampKey::new("S1", "C1");
        let store = InMemoryCounterStore::with_records([StampRecord::new(key.clone(), 2)]);

        let record = store.get_item(&key).expect("get should succeed");
        assert_eq!(record, Some(StampRecord::new(key.clone(), 2)));
        assert_eq!(store.operations(), vec![StoreOperation::Get(key)]);
    }

    #[test]
    fn overflowing_add_is_rejected_without_writing() {
        let key = StampKey::new("S1", "C1");
        let store = InMemoryCounterStore::with_records([StampRecord::new(key.clone(), i64::MAX)]);

        let error = store
            .update_item(&key, UpdateSpec::Add(1))
            .expect_err("overflow should fail");
        assert!(matches!(error, StoreError::Rejected { .. }));
        assert_eq!(store.stamps(&key), Some(i64::MAX));
    }
}
