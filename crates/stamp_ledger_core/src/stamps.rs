//! Counter arithmetic and the outcome messages returned to callers.

use crate::contract::{LedgerOutcome, OutcomeKind, RequestType};
use crate::record::StampKey;

/// `max(current - requested, 0)`, without overflowing on extreme inputs.
pub fn clamped_decrement(current: i64, requested: i64) -> i64 {
    current.saturating_sub(requested).max(0)
}

pub fn found(key: StampKey, stamps: i64) -> LedgerOutcome {
    let message = format!("{key} has {stamps} stamps");
    outcome(OutcomeKind::Found, RequestType::GetStamps, key, Some(stamps), message)
}

pub fn added(key: StampKey, number_of_stamps: i64, stamps: i64, created: bool) -> LedgerOutcome {
    let message = format!("Successfully added {number_of_stamps} stamps for {key}");
    let kind = if created {
        OutcomeKind::Created
    } else {
        OutcomeKind::Incremented
    };
    outcome(kind, RequestType::AddStamps, key, Some(stamps), message)
}

pub fn reset(key: StampKey) -> LedgerOutcome {
    let message = format!("Successfully reset stamps for {key}");
    outcome(OutcomeKind::Reset, RequestType::ResetStamps, key, Some(0), message)
}

pub fn deleted(key: StampKey, number_of_stamps: i64, stamps: i64) -> LedgerOutcome {
    let message = format!(
        "Successfully deleted {number_of_stamps} stamps for {key}. New number of stamps: {stamps}"
    );
    outcome(
        OutcomeKind::Decremented,
        RequestType::DeleteStamps,
        key,
        Some(stamps),
        message,
    )
}

pub fn not_found(request_type: RequestType, key: StampKey) -> LedgerOutcome {
    let message = format!("Could not find record with {key}");
    outcome(OutcomeKind::NotFound, request_type, key, None, message)
}

fn outcome(
    kind: OutcomeKind,
    request_type: RequestType,
    key: StampKey,
    stamps: Option<i64>,
    message: String,
) -> LedgerOutcome {
    LedgerOutcome {
        outcome: kind,
        request_type,
        key,
        stamps,
        message,
    }
}
