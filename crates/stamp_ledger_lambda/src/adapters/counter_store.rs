use crate::runtime::record::{StampKey, StampRecord, UpdateSpec};

/// Key-value table holding one stamp counter per (store, customer) pair.
pub trait CounterStore {
    fn get_item(&self, key: &StampKey) -> Result<Option<StampRecord>, StoreError>;

    fn put_item(&self, record: &StampRecord) -> Result<(), StoreError>;

    /// Applies `update` to an existing record and returns the record as stored
    /// afterwards.
    fn update_item(&self, key: &StampKey, update: UpdateSpec) -> Result<StampRecord, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
    #[error("counter store rejected {operation}: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
    #[error("stored item for {key} is malformed: {reason}")]
    MalformedItem { key: StampKey, reason: String },
}
