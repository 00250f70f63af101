use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::adapters::counter_store::{CounterStore, StoreError};
use crate::runtime::contract::{
    parse_request, LedgerOutcome, OutcomeKind, RequestType, StampRequest, ValidationError,
};
use crate::runtime::record::{StampKey, StampRecord, UpdateSpec};
use crate::runtime::stamps;

const COMPONENT: &str = "ledger_handler";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0} is not implemented")]
    NotImplemented(RequestType),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotImplemented(_) => 501,
            Self::Store(_) => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(error) => error.error_code(),
            Self::NotImplemented(_) => "not_implemented",
            Self::Store(_) => "store_error",
        }
    }
}

/// Entry point shared by the Lambda and local-invoke binaries. Every outcome,
/// including failures, is rendered as a response; nothing is propagated to the
/// runtime.
pub fn handle_ledger_event(event: Value, store: &dyn CounterStore) -> ApiGatewayResponse {
    let request = match normalize_apigw_event(event)
        .map_err(ValidationError::Malformed)
        .and_then(parse_request)
    {
        Ok(value) => value,
        Err(error) => return failure(LedgerError::from(error)),
    };

    let span = tracing::info_span!(
        "ledger_request",
        request_type = %request.request_type(),
        store_id = %request.store_id(),
    );
    let _entered = span.enter();

    match execute(&request, store) {
        Ok(outcome) => {
            log_outcome(&outcome);
            success_response(200, &outcome)
        }
        Err(error) => failure(error),
    }
}

pub fn execute(
    request: &StampRequest,
    store: &dyn CounterStore,
) -> Result<LedgerOutcome, LedgerError> {
    match request {
        StampRequest::GetStamps { key } => get_stamps(key, store),
        StampRequest::AddStamps {
            key,
            number_of_stamps,
        } => add_stamps(key, *number_of_stamps, store),
        StampRequest::ResetStamps { key } => reset_stamps(key, store),
        StampRequest::DeleteStamps {
            key,
            number_of_stamps,
        } => delete_stamps(key, *number_of_stamps, store),
        StampRequest::SetupCustomer { .. } => {
            Err(LedgerError::NotImplemented(RequestType::SetupCustomer))
        }
    }
}

fn get_stamps(key: &StampKey, store: &dyn CounterStore) -> Result<LedgerOutcome, LedgerError> {
    match store.get_item(key)? {
        Some(record) => Ok(stamps::found(record.key, record.stamps)),
        None => Ok(stamps::not_found(RequestType::GetStamps, key.clone())),
    }
}

fn add_stamps(
    key: &StampKey,
    number_of_stamps: i64,
    store: &dyn CounterStore,
) -> Result<LedgerOutcome, LedgerError> {
    if let Some(current) = store.get_item(key)? {
        // Stored counts must stay readable as i64 after the additive update.
        if current.stamps.checked_add(number_of_stamps).is_none() {
            return Err(ValidationError::StampCountOverflow {
                current: current.stamps,
                added: number_of_stamps,
            }
            .into());
        }
        let updated = store.update_item(key, UpdateSpec::Add(number_of_stamps))?;
        return Ok(stamps::added(key.clone(), number_of_stamps, updated.stamps, false));
    }

    // A miss followed by a put: two first adds racing on one key keep the last.
    store.put_item(&StampRecord::new(key.clone(), number_of_stamps))?;
    Ok(stamps::added(key.clone(), number_of_stamps, number_of_stamps, true))
}

fn reset_stamps(key: &StampKey, store: &dyn CounterStore) -> Result<LedgerOutcome, LedgerError> {
    if store.get_item(key)?.is_none() {
        return Ok(stamps::not_found(RequestType::ResetStamps, key.clone()));
    }
    store.update_item(key, UpdateSpec::Set(0))?;
    Ok(stamps::reset(key.clone()))
}

fn delete_stamps(
    key: &StampKey,
    number_of_stamps: i64,
    store: &dyn CounterStore,
) -> Result<LedgerOutcome, LedgerError> {
    let Some(current) = store.get_item(key)? else {
        return Ok(stamps::not_found(RequestType::DeleteStamps, key.clone()));
    };

    // Read-then-set, not conditional: a concurrent writer on this key can be lost.
    let new_stamps = stamps::clamped_decrement(current.stamps, number_of_stamps);
    store.update_item(key, UpdateSpec::Set(new_stamps))?;
    Ok(stamps::deleted(key.clone(), number_of_stamps, new_stamps))
}

fn normalize_apigw_event(event: Value) -> Result<Value, String> {
    let Some(object) = event.as_object() else {
        return Err("Request payload must be a JSON object".to_string());
    };

    let Some(body) = object.get("body") else {
        return Ok(event);
    };

    match body {
        Value::Null => Ok(json!({})),
        Value::Object(_) => Ok(body.clone()),
        Value::String(text) => {
            serde_json::from_str(text).map_err(|error| format!("Malformed JSON body: {error}"))
        }
        _ => Err("Request body must be a JSON object".to_string()),
    }
}

fn log_outcome(outcome: &LedgerOutcome) {
    let event_name = match outcome.outcome {
        OutcomeKind::Found => "stamps_read",
        OutcomeKind::Created | OutcomeKind::Incremented => "stamps_added",
        OutcomeKind::Reset => "stamps_reset",
        OutcomeKind::Decremented => "stamps_deleted",
        OutcomeKind::NotFound => "record_not_found",
    };
    info!(
        component = COMPONENT,
        event = event_name,
        outcome = ?outcome.outcome,
        store_id = %outcome.key.store_id,
        customer_id = %outcome.key.customer_id,
        stamps = outcome.stamps,
        mutated = outcome.outcome.is_mutation(),
    );
}

fn failure(error: LedgerError) -> ApiGatewayResponse {
    match &error {
        LedgerError::Validation(_) => {
            warn!(component = COMPONENT, event = "request_rejected", error = %error);
        }
        LedgerError::NotImplemented(_) => {
            warn!(component = COMPONENT, event = "not_implemented", error = %error);
        }
        LedgerError::Store(_) => {
            error!(component = COMPONENT, event = "store_failed", error = %error);
        }
    }

    error_response(
        error.status_code(),
        json!({
            "error": error.error_code(),
            "message": error.to_string(),
        }),
    )
}

fn success_response(status_code: u16, payload: impl Serialize) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: serde_json::to_string(&payload).expect("response payload should serialize"),
    }
}

fn error_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}
