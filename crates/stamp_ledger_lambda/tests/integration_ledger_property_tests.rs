mod support;

use proptest::prelude::*;
use stamp_ledger_lambda::adapters::memory::InMemoryCounterStore;
use stamp_ledger_lambda::handlers::ledger::handle_ledger_event;
use stamp_ledger_lambda::runtime::record::{StampKey, StampRecord};
use support::events::{add_event, delete_event, outcome, reset_event, CUSTOMER_ID, STORE_ID};

const MAX_STAMPS: i64 = 1_000_000;

fn key() -> StampKey {
    StampKey::new(STORE_ID, CUSTOMER_ID)
}

proptest! {
    #[test]
    fn consecutive_adds_sum(first in 0..MAX_STAMPS, second in 0..MAX_STAMPS) {
        let store = InMemoryCounterStore::new();

        handle_ledger_event(add_event(STORE_ID, CUSTOMER_ID, first), &store);
        handle_ledger_event(add_event(STORE_ID, CUSTOMER_ID, second), &store);

        prop_assert_eq!(store.stamps(&key()), Some(first + second));
    }

    #[test]
    fn delete_clamps_at_zero(current in 0..MAX_STAMPS, requested in 0..MAX_STAMPS) {
        let store = InMemoryCounterStore::with_records([StampRecord::new(key(), current)]);

        let response = handle_ledger_event(delete_event(STORE_ID, CUSTOMER_ID, requested), &store);

        prop_assert_eq!(response.status_code, 200);
        prop_assert_eq!(store.stamps(&key()), Some((current - requested).max(0)));
    }

    #[test]
    fn reset_zeroes_existing_and_is_idempotent(current in 0..MAX_STAMPS) {
        let store = InMemoryCounterStore::with_records([StampRecord::new(key(), current)]);

        handle_ledger_event(reset_event(STORE_ID, CUSTOMER_ID), &store);
        prop_assert_eq!(store.stamps(&key()), Some(0));

        let second = handle_ledger_event(reset_event(STORE_ID, CUSTOMER_ID), &store);
        prop_assert_eq!(outcome(&second), "reset");
        prop_assert_eq!(store.stamps(&key()), Some(0));
        prop_assert_eq!(store.len(), 1);
    }

    #[test]
    fn mixed_operations_never_go_negative(
        operations in prop::collection::vec((0u8..3, 0..MAX_STAMPS), 1..20)
    ) {
        let store = InMemoryCounterStore::new();

        for (kind, count) in operations {
            let event = match kind {
                0 => add_event(STORE_ID, CUSTOMER_ID, count),
                1 => delete_event(STORE_ID, CUSTOMER_ID, count),
                _ => reset_event(STORE_ID, CUSTOMER_ID),
            };
            handle_ledger_event(event, &store);
            if let Some(stamps) = store.stamps(&key()) {
                prop_assert!(stamps >= 0);
            }
        }
    }
}

#[test]
fn reset_on_missing_key_creates_nothing() {
    let store = InMemoryCounterStore::new();

    let first = handle_ledger_event(reset_event(STORE_ID, CUSTOMER_ID), &store);
    let second = handle_ledger_event(reset_event(STORE_ID, CUSTOMER_ID), &store);

    assert_eq!(outcome(&first), "not_found");
    assert_eq!(outcome(&second), "not_found");
    assert!(store.is_empty());
}
