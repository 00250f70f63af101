use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TABLE_NAME: &str = "StampInfo";
pub const STORE_ID_ATTRIBUTE: &str = "StoreId";
pub const CUSTOMER_ID_ATTRIBUTE: &str = "CustomerId";
pub const STAMPS_ATTRIBUTE: &str = "Stamps";
pub const UPDATE_VALUE_PLACEHOLDER: &str = ":val";

/// Composite key of a stamp record: one customer at one store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub struct StampKey {
    pub store_id: String,
    pub customer_id: String,
}

impl StampKey {
    pub fn new(store_id: impl Into<String>, customer_id: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            customer_id: customer_id.into(),
        }
    }
}

impl fmt::Display for StampKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoreId: {} and CustomerId: {}",
            self.store_id, self.customer_id
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StampRecord {
    pub key: StampKey,
    pub stamps: i64,
}

impl StampRecord {
    pub fn new(key: StampKey, stamps: i64) -> Self {
        Self { key, stamps }
    }
}

/// Mutation applied to the `Stamps` attribute of an existing record.
///
/// `Add` is evaluated by the store itself, so concurrent increments on the
/// same key compose. `Set` overwrites unconditionally; callers that computed
/// the value from an earlier read race with any other writer on that key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSpec {
    Add(i64),
    Set(i64),
}

impl UpdateSpec {
    pub fn expression(self) -> String {
        match self {
            Self::Add(_) => format!(
                "SET {STAMPS_ATTRIBUTE} = {STAMPS_ATTRIBUTE} + {UPDATE_VALUE_PLACEHOLDER}"
            ),
            Self::Set(_) => format!("SET {STAMPS_ATTRIBUTE} = {UPDATE_VALUE_PLACEHOLDER}"),
        }
    }

    pub fn value(self) -> i64 {
        match self {
            Self::Add(value) | Self::Set(value) => value,
        }
    }

    /// Stamp count after applying this update to `current`, or `None` when an
    /// add would overflow.
    pub fn apply(self, current: i64) -> Option<i64> {
        match self {
            Self::Add(delta) => current.checked_add(delta),
            Self::Set(value) => Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_update_references_current_value() {
        let update = UpdateSpec::Add(3);
        assert_eq!(update.expression(), "SET Stamps = Stamps + :val");
        assert_eq!(update.value(), 3);
        assert_eq!(update.apply(4), Some(7));
    }

    #[test]
    fn set_update_overwrites_current_value() {
        let update = UpdateSpec::Set(0);
        assert_eq!(update.expression(), "SET Stamps = :val");
        assert_eq!(update.apply(12), Some(0));
    }

    #[test]
    fn additive_update_reports_overflow() {
        assert_eq!(UpdateSpec::Add(1).apply(i64::MAX), None);
        assert_eq!(UpdateSpec::Set(0).apply(i64::MAX), Some(0));
    }

    #[test]
    fn key_display_names_both_identifiers() {
        let key = StampKey::new("12345", "54312");
        assert_eq!(key.to_string(), "StoreId: 12345 and CustomerId: 54312");
    }
}
